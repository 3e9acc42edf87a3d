// ============================================
// File: crates/mobattest-transport/src/mock.rs
// ============================================
//! # Mock Transport Implementation
//!
//! ## Creation Reason
//! Provides an in-memory transport for testing attested connections
//! without any network.
//!
//! ## Main Functionality
//! - Responses produced by a handler closure
//! - Optional artificial latency, overall or per path (to make
//!   concurrency and deadlines observable)
//! - Every call recorded for verification
//!
//! ## Usage in Tests
//! ```ignore
//! use mobattest_transport::mock::MockTransport;
//! use mobattest_transport::{CallOptions, Transport};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let transport = MockTransport::new(|_path, request| Ok(request.to_vec()));
//! let echoed = transport.call("/echo", b"hi", &CallOptions::new()).await.unwrap();
//! assert_eq!(echoed, b"hi");
//! assert_eq!(transport.call_count("/echo"), 1);
//! # }
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - This is for testing only - do not use in production
//! - Calls are recorded before the latency sleep, so concurrent callers
//!   are counted as soon as they reach the transport
//!
//! ## Last Modified
//! v0.1.0 - Initial mock implementation

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::Result;
use crate::traits::{BasicCredentials, CallOptions, Transport};

type Handler = dyn Fn(&str, &[u8]) -> Result<Vec<u8>> + Send + Sync;

// ============================================
// RecordedCall
// ============================================

/// A call observed by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Call path.
    pub path: String,
    /// Request bytes.
    pub request: Vec<u8>,
    /// `Authorization` header value, if any.
    pub authorization: Option<String>,
    /// Deadline passed with the call.
    pub timeout: Option<Duration>,
}

// ============================================
// MockTransport
// ============================================

/// Mock transport for testing.
pub struct MockTransport {
    handler: Box<Handler>,
    latency: Option<Duration>,
    path_latency: Vec<(String, Duration)>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    /// Creates a mock answering every call with `handler`.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&str, &[u8]) -> Result<Vec<u8>> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            latency: None,
            path_latency: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Delays every response by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Delays responses on `path` by `latency`, overriding `with_latency`.
    #[must_use]
    pub fn with_path_latency(mut self, path: impl Into<String>, latency: Duration) -> Self {
        self.path_latency.push((path.into(), latency));
        self
    }

    fn latency_for(&self, path: &str) -> Option<Duration> {
        self.path_latency
            .iter()
            .find(|(slow, _)| slow == path)
            .map(|(_, latency)| *latency)
            .or(self.latency)
    }

    /// Returns every recorded call, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Returns how many calls were made to `path`.
    #[must_use]
    pub fn call_count(&self, path: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.path == path).count()
    }

    /// Returns how many calls were made in total.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }

    /// Forgets recorded calls.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransport")
            .field("latency", &self.latency)
            .field("calls", &self.total_calls())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(&self, path: &str, request: &[u8], options: &CallOptions) -> Result<Vec<u8>> {
        self.calls.lock().push(RecordedCall {
            path: path.to_owned(),
            request: request.to_vec(),
            authorization: options
                .authorization
                .as_ref()
                .map(BasicCredentials::authorization_header),
            timeout: options.timeout,
        });

        if let Some(latency) = self.latency_for(path) {
            tokio::time::sleep(latency).await;
        }

        (self.handler)(path, request)
    }
}
