// ============================================
// File: crates/mobattest-core/src/error.rs
// ============================================
//! # Core Error Types
//!
//! ## Creation Reason
//! Defines the narrow error taxonomies of the attestation core: framing
//! errors from the codecs, AEAD errors from the cipher, verification
//! errors from the attestation verifier and handshake errors from the
//! AKE state machine.
//!
//! ## Main Functionality
//! - `CoreError`: Wire-format encoding and decoding failures
//! - `AeadError`: `Aead` (authentication failure) and `Cipher` (framing)
//! - `VerificationError`: Why a peer's evidence was rejected
//! - `AkeError`: Handshake failures surfaced by `auth_end`
//!
//! ## Error Categories
//! 1. **Framing**: truncated or oversized frames, unknown message types
//! 2. **AEAD**: tag mismatch vs. malformed ciphertext
//! 3. **Attestation**: policy rejection, bad authority signature
//! 4. **State**: operations invoked in the wrong session state
//!
//! ## ⚠️ Important Note for Next Developer
//! - NEVER include key material or plaintext in error messages
//! - `AttestationVerificationFailed` must stay distinct from framing errors;
//!   callers treat it as "trust broken" rather than "server bug"
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

use mobattest_common::error::CommonError;
use mobattest_common::Measurement;

use crate::attest::QuoteStatus;

// ============================================
// Result Type Alias
// ============================================

/// Result type for core codec operations.
pub type Result<T> = std::result::Result<T, CoreError>;

// ============================================
// CoreError
// ============================================

/// Wire-format errors raised while encoding or decoding frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Unknown or unsupported message type.
    #[error("Unknown message type: 0x{0:02x}")]
    UnknownMessageType(u8),

    /// Handshake version mismatch.
    #[error("Unsupported handshake version: {got}, expected {expected}")]
    UnsupportedVersion {
        /// Version received
        got: u8,
        /// Version expected
        expected: u8,
    },

    /// Message is malformed.
    #[error("Malformed message: {reason}")]
    MalformedMessage {
        /// What's wrong with the message
        reason: String,
    },

    /// Message is too short to be valid.
    #[error("Message too short: expected at least {expected} bytes, got {actual}")]
    MessageTooShort {
        /// Minimum expected length
        expected: usize,
        /// Actual length received
        actual: usize,
    },

    /// Field exceeds maximum allowed size.
    #[error("Field too large: max {max} bytes, got {actual}")]
    MessageTooLarge {
        /// Maximum allowed size
        max: usize,
        /// Actual size
        actual: usize,
    },

    /// Wrapped common error.
    #[error(transparent)]
    Common(#[from] CommonError),
}

impl CoreError {
    /// Creates a `MalformedMessage` error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedMessage {
            reason: reason.into(),
        }
    }

    /// Creates a `MessageTooShort` error.
    #[must_use]
    pub const fn too_short(expected: usize, actual: usize) -> Self {
        Self::MessageTooShort { expected, actual }
    }

    /// Creates a `MessageTooLarge` error.
    #[must_use]
    pub const fn too_large(max: usize, actual: usize) -> Self {
        Self::MessageTooLarge { max, actual }
    }
}

// ============================================
// AeadError
// ============================================

/// Errors from the AEAD cipher.
///
/// Both are terminal for the call that produced them. Whether they
/// invalidate the session is decided by the owner of the cipher.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AeadError {
    /// Authentication tag mismatch (wrong key, wrong AAD, tampering).
    #[error("AEAD authentication failed")]
    Aead,

    /// Ciphertext framing is malformed, or the nonce space is exhausted.
    #[error("Malformed ciphertext: {reason}")]
    Cipher {
        /// What's wrong with the frame
        reason: &'static str,
    },
}

// ============================================
// VerificationError
// ============================================

/// Reasons the attestation verifier rejects peer evidence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    /// Evidence was not signed by the configured attestation authority.
    #[error("evidence signature does not verify against the attestation authority")]
    BadSignature,

    /// Evidence bytes could not be parsed.
    #[error("malformed evidence: {reason}")]
    MalformedEvidence {
        /// What's wrong with the evidence
        reason: String,
    },

    /// The quote status is never acceptable (out of date, revoked).
    #[error("quote status '{status}' is not acceptable")]
    QuoteRejected {
        /// Reported status
        status: QuoteStatus,
    },

    /// No policy entry accepts the reported identity and advisories.
    #[error("no policy entry accepts enclave {mr_enclave} (signer {mr_signer})")]
    NoMatchingMeasurement {
        /// Reported MRENCLAVE
        mr_enclave: Measurement,
        /// Reported MRSIGNER
        mr_signer: Measurement,
    },

    /// The report does not bind the key the peer presented.
    #[error("report data does not bind the presented key")]
    IdentityBinding,
}

// ============================================
// AkeError
// ============================================

/// Errors from the AKE state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AkeError {
    /// Operation invoked in the wrong state (programming error).
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// What was misused
        reason: String,
    },

    /// The peer's identity was rejected by policy.
    #[error("Attestation verification failed: {0}")]
    AttestationVerificationFailed(#[from] VerificationError),

    /// The auth response could not be decoded.
    #[error("Malformed auth response: {0}")]
    MalformedResponse(#[from] CoreError),

    /// Diffie-Hellman or key derivation failed.
    #[error("Key exchange failed: {reason}")]
    KeyExchange {
        /// Why key exchange failed
        reason: &'static str,
    },

    /// The responder's key confirmation did not open under the derived key.
    #[error("Key confirmation failed")]
    KeyConfirmation,
}

impl AkeError {
    /// Creates an `InvalidInput` error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Returns `true` if the peer was positively rejected (trust broken).
    #[must_use]
    pub const fn is_trust_failure(&self) -> bool {
        matches!(
            self,
            Self::AttestationVerificationFailed(_) | Self::KeyConfirmation
        )
    }

    /// Returns `true` if the response itself was unparseable.
    #[must_use]
    pub const fn is_malformed_response(&self) -> bool {
        matches!(self, Self::MalformedResponse(_))
    }

    /// Returns `true` for state-machine misuse.
    #[must_use]
    pub const fn is_programming_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}

// ============================================
// Tests
// ============================================
