// ============================================
// File: crates/mobattest-client/src/error.rs
// ============================================
//! # Client Error Types
//!
//! ## Creation Reason
//! One error type for everything a caller of an attested service can
//! observe, with a classification that tells "retry later" apart from
//! "trust broken" and "server bug".
//!
//! ## Error Classes
//! | Class | Meaning | Examples |
//! |-------|---------|----------|
//! | `Transient` | Retry later | network failure, timeout, 5xx |
//! | `AttestationTrust` | Investigate the enclave | policy rejection, AEAD failure after retry |
//! | `MalformedResponse` | Server-side bug | undecodable payload, AAD mismatch |
//! | `Misuse` | Caller bug | bad config, state machine misuse |
//!
//! ## ⚠️ Important Note for Next Developer
//! - `requires_reattestation` drives the single retry in `AttestedConnection`;
//!   keep it in sync with what the peer can do to a session
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

use mobattest_common::error::CommonError;
use mobattest_core::error::{AeadError, AkeError, CoreError, VerificationError};
use mobattest_transport::error::TransportError;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

// ============================================
// ErrorClass
// ============================================

/// What a caller should do about an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Transient; safe to retry at a higher layer.
    Transient,
    /// The remote enclave could not be trusted.
    AttestationTrust,
    /// The server sent something it should not have.
    MalformedResponse,
    /// The caller misused the API or misconfigured the client.
    Misuse,
}

// ============================================
// ClientError
// ============================================

/// Client error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Configuration file could not be read or parsed.
    #[error("Failed to load configuration from '{path}': {reason}")]
    ConfigLoad {
        /// File path or source name.
        path: String,
        /// Parse or I/O failure.
        reason: String,
    },

    /// Configuration parsed but a value is unusable.
    #[error("Invalid configuration: {field} - {reason}")]
    ConfigInvalid {
        /// Dotted path of the offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A section needed by the requested client is absent.
    #[error("Missing required configuration: {field}")]
    ConfigMissing {
        /// Name of the missing section or field.
        field: String,
    },

    /// The handshake failed or the state machine was misused.
    #[error("Attestation failed: {0}")]
    Attestation(#[from] AkeError),

    /// A response frame failed to open (forged, reflected or replayed).
    #[error("Response failed authentication: {0}")]
    Aead(#[from] AeadError),

    /// The response carries another session's channel binding.
    #[error("Response was sealed for a different channel")]
    ChannelMismatch,

    /// The response opened, but under a different AAD than the request.
    #[error("Response AAD does not match the request AAD")]
    AadMismatch,

    /// The server answered with an undecodable payload.
    #[error("Invalid server response: {reason}")]
    InvalidServerResponse {
        /// Method path and decode failure.
        reason: String,
    },

    /// The report response has no report with the requested id.
    #[error("Fog report '{report_id}' not found")]
    ReportNotFound {
        /// Requested report id.
        report_id: String,
    },

    /// The report key expires before the caller needs it.
    #[error("Fog report '{report_id}' expires at {expiry}, need at least {minimum}")]
    ReportExpired {
        /// Report id.
        report_id: String,
        /// Published expiry block.
        expiry: u64,
        /// Expiry the caller required.
        minimum: u64,
    },

    /// The report evidence failed the ingest policy.
    #[error("Fog report rejected: {0}")]
    ReportInvalid(VerificationError),

    /// Transport failure (network, status, timeout, unauthenticated).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Framing failure in the core codecs.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Invalid shared identifier.
    #[error(transparent)]
    Common(#[from] CommonError),
}

impl ClientError {
    /// Creates a `ConfigLoad` error.
    pub fn config_load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `ConfigInvalid` error.
    pub fn config_invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `ConfigMissing` error.
    pub fn config_missing(field: impl Into<String>) -> Self {
        Self::ConfigMissing {
            field: field.into(),
        }
    }

    /// Creates an `InvalidServerResponse` error.
    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidServerResponse {
            reason: reason.into(),
        }
    }

    /// Returns `true` if the session must be discarded and re-established.
    #[must_use]
    pub const fn requires_reattestation(&self) -> bool {
        matches!(
            self,
            Self::Aead(_)
                | Self::ChannelMismatch
                | Self::Transport(TransportError::Unauthenticated { .. })
        )
    }

    /// Classifies the error for the caller.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Transport(TransportError::InvalidConfig { .. } | TransportError::Common(_))
            | Self::ConfigLoad { .. }
            | Self::ConfigInvalid { .. }
            | Self::ConfigMissing { .. }
            | Self::Attestation(AkeError::InvalidInput { .. })
            | Self::Common(_) => ErrorClass::Misuse,

            Self::Transport(_) | Self::ReportExpired { .. } => ErrorClass::Transient,

            Self::Attestation(AkeError::MalformedResponse(_))
            | Self::InvalidServerResponse { .. }
            | Self::AadMismatch
            | Self::ReportNotFound { .. }
            | Self::Core(_) => ErrorClass::MalformedResponse,

            Self::Attestation(_)
            | Self::Aead(_)
            | Self::ChannelMismatch
            | Self::ReportInvalid(_) => ErrorClass::AttestationTrust,
        }
    }

    /// Returns `true` if retrying later may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.class(), ErrorClass::Transient)
    }

    /// Returns `true` for configuration errors.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigLoad { .. } | Self::ConfigInvalid { .. } | Self::ConfigMissing { .. }
        )
    }
}

// ============================================
// Tests
// ============================================
