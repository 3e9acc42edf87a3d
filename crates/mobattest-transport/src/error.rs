// ============================================
// File: crates/mobattest-transport/src/error.rs
// ============================================
//! # Transport Error Types
//!
//! ## Creation Reason
//! Defines the failures a request/response transport can report to an
//! attested connection.
//!
//! ## Error Categories
//! 1. **Network Errors**: Connection refused, reset, DNS failure
//! 2. **Status Errors**: The peer answered with a non-success status
//! 3. **Session Errors**: The peer no longer recognises our attestation
//! 4. **Configuration Errors**: Invalid endpoint or credential settings
//!
//! ## ⚠️ Important Note for Next Developer
//! - `Unauthenticated` is the only variant that touches session state;
//!   the connection re-attests on it
//! - Everything else is surfaced to the caller unchanged
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

use mobattest_common::error::CommonError;

// ============================================
// Result Type Alias
// ============================================

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

// ============================================
// TransportError
// ============================================

/// Transport layer error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    // ========================================
    // Network Errors
    // ========================================

    /// The request never produced a response.
    #[error("Network failure calling {path}: {reason}")]
    Network {
        /// Call path
        path: String,
        /// What went wrong
        reason: String,
    },

    /// The call exceeded its deadline.
    #[error("Call to {path} timed out after {after_ms}ms")]
    Timeout {
        /// Call path
        path: String,
        /// Deadline that was exceeded
        after_ms: u64,
    },

    // ========================================
    // Status Errors
    // ========================================

    /// The peer answered with a non-success status.
    #[error("Call to {path} failed with status {code}: {message}")]
    Status {
        /// Call path
        path: String,
        /// Status code (HTTP semantics)
        code: u16,
        /// Status message from the peer
        message: String,
    },

    /// The peer requires a fresh attestation.
    #[error("Call to {path} rejected: attestation required")]
    Unauthenticated {
        /// Call path
        path: String,
    },

    // ========================================
    // Configuration Errors
    // ========================================

    /// Invalid configuration.
    #[error("Invalid configuration: {field} - {reason}")]
    InvalidConfig {
        /// Configuration field name
        field: String,
        /// Why it's invalid
        reason: String,
    },

    // ========================================
    // Wrapped Errors
    // ========================================

    /// Error from common crate.
    #[error(transparent)]
    Common(#[from] CommonError),
}

impl TransportError {
    // ========================================
    // Convenience Constructors
    // ========================================

    /// Creates a `Network` error.
    pub fn network(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Network {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `Status` error.
    pub fn status(path: impl Into<String>, code: u16, message: impl Into<String>) -> Self {
        Self::Status {
            path: path.into(),
            code,
            message: message.into(),
        }
    }

    /// Creates an `Unauthenticated` error.
    pub fn unauthenticated(path: impl Into<String>) -> Self {
        Self::Unauthenticated { path: path.into() }
    }

    /// Creates an `InvalidConfig` error.
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    // ========================================
    // Error Classification
    // ========================================

    /// Returns `true` if this error is transient and retryable.
    ///
    /// The core never retries these itself; the flag is for callers.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Timeout { .. } => true,
            Self::Status { code, .. } => *code >= 500 || *code == 429,
            _ => false,
        }
    }

    /// Returns `true` if the peer asked for a new attestation.
    #[must_use]
    pub const fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated { .. })
    }
}

// ============================================
// Tests
// ============================================
