// ============================================
// File: crates/mobattest-transport/src/traits.rs
// ============================================
//! # Transport Traits
//!
//! ## Creation Reason
//! Defines the request/response capability attested connections are
//! parameterized by. Concrete gRPC or HTTP stacks implement it outside
//! this workspace.
//!
//! ## Main Functionality
//! - `Transport`: `call(path, request, options) -> response`
//! - `CallOptions`: Per-call headers, authorization and timeout
//! - `BasicCredentials`: HTTP Basic authorization
//!
//! ## ⚠️ Important Note for Next Developer
//! - Implementations must be Send + Sync for use in async contexts
//! - Request and response bytes are opaque here; never inspect them
//!
//! ## Last Modified
//! v0.1.0 - Initial trait definitions

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use zeroize::Zeroizing;

use crate::error::Result;

// ============================================
// BasicCredentials
// ============================================

/// HTTP Basic credentials attached to a connection.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl BasicCredentials {
    /// Creates credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the `Authorization` header value.
    ///
    /// ```text
    /// Basic base64(username ":" password)
    /// ```
    #[must_use]
    pub fn authorization_header(&self) -> String {
        let joined = Zeroizing::new(format!("{}:{}", self.username, self.password.as_str()));
        format!("Basic {}", STANDARD.encode(joined.as_bytes()))
    }
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

// ============================================
// CallOptions
// ============================================

/// Per-call settings passed through to the transport.
///
/// The core fills these in; only the transport interprets them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Extra request headers / metadata.
    pub headers: Vec<(String, String)>,
    /// Basic authorization, if configured on the connection.
    pub authorization: Option<BasicCredentials>,
    /// Deadline for this call.
    pub timeout: Option<Duration>,
}

impl CallOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the authorization.
    #[must_use]
    pub fn with_authorization(mut self, credentials: Option<BasicCredentials>) -> Self {
        self.authorization = credentials;
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

// ============================================
// Transport Trait
// ============================================

/// Request/response transport.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; one transport is shared by
/// every call on a connection.
///
/// # Example
/// ```ignore
/// let response = transport
///     .call("/consensus_client.ConsensusClientAPI/ClientTxPropose", &bytes, &options)
///     .await?;
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues one call and returns the serialized response.
    ///
    /// # Errors
    /// Returns a `TransportError` for network, status or session failures.
    async fn call(&self, path: &str, request: &[u8], options: &CallOptions) -> Result<Vec<u8>>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn call(&self, path: &str, request: &[u8], options: &CallOptions) -> Result<Vec<u8>> {
        (**self).call(path, request, options).await
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_header() {
        let creds = BasicCredentials::new("alice", "s3cret");
        // base64("alice:s3cret")
        assert_eq!(creds.authorization_header(), "Basic YWxpY2U6czNjcmV0");
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = BasicCredentials::new("alice", "s3cret");
        let debug = format!("{creds:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_call_options_builder() {
        let options = CallOptions::new()
            .with_header("x-request-id", "7")
            .with_timeout(Some(Duration::from_secs(3)));
        assert_eq!(options.headers.len(), 1);
        assert_eq!(options.timeout, Some(Duration::from_secs(3)));
        assert!(options.authorization.is_none());
    }
}
