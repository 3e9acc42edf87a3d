// ============================================
// File: crates/mobattest-transport/src/timeout.rs
// ============================================
//! # Deadline Enforcement
//!
//! ## Creation Reason
//! Timeout policy belongs to the transport layer. `TimeoutTransport`
//! wraps any transport and turns an elapsed deadline into an ordinary
//! `TransportError::Timeout`, which never forces re-attestation.
//!
//! ## Last Modified
//! v0.1.0 - Initial timeout wrapper

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::{CallOptions, Transport};

/// Applies a deadline to every call of the wrapped transport.
///
/// A per-call `CallOptions::timeout` takes precedence over the default.
#[derive(Debug, Clone)]
pub struct TimeoutTransport<T> {
    inner: T,
    default_timeout: Duration,
}

impl<T: Transport> TimeoutTransport<T> {
    /// Wraps `inner` with `default_timeout`.
    pub const fn new(inner: T, default_timeout: Duration) -> Self {
        Self {
            inner,
            default_timeout,
        }
    }

    /// Returns the wrapped transport.
    pub const fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for TimeoutTransport<T> {
    async fn call(&self, path: &str, request: &[u8], options: &CallOptions) -> Result<Vec<u8>> {
        let deadline = options.timeout.unwrap_or(self.default_timeout);
        match tokio::time::timeout(deadline, self.inner.call(path, request, options)).await {
            Ok(result) => result,
            Err(_) => {
                let after_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX);
                debug!(path, after_ms, "Call timed out");
                Err(TransportError::Timeout {
                    path: path.to_owned(),
                    after_ms,
                })
            }
        }
    }
}
