// ============================================
// File: crates/mobattest-client/src/services/unattested.rs
// ============================================
//! # Unattested Connection
//!
//! ## Creation Reason
//! Some endpoints (fog blocks, untrusted TxOut lookups, fog reports) are
//! served outside any enclave. Their payloads are plain protobuf and
//! their trust comes from elsewhere (merkle proofs, signed reports).
//!
//! ## Main Functionality
//! - Typed protobuf request/response over a `Transport`
//! - Connection-level Basic authorization
//! - Per-connection tracing span
//!
//! ## Last Modified
//! v0.1.0 - Initial unattested connection

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use prost::Message;
use tracing::{debug, info_span, Instrument, Span};

use mobattest_transport::{BasicCredentials, CallOptions, Transport};

use crate::error::{ClientError, Result};

/// Plain request/response connection to a non-enclave endpoint.
pub struct UnattestedConnection {
    transport: Arc<dyn Transport>,
    authorization: RwLock<Option<BasicCredentials>>,
    timeout: Option<Duration>,
    span: Span,
}

impl UnattestedConnection {
    /// Creates a connection for `service` over `transport`.
    pub fn new(service: &'static str, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            authorization: RwLock::new(None),
            timeout: None,
            span: info_span!("unattested_connection", service),
        }
    }

    /// Sets the per-call timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Installs initial credentials.
    #[must_use]
    pub fn with_authorization(self, credentials: Option<BasicCredentials>) -> Self {
        *self.authorization.write() = credentials;
        self
    }

    /// Sends `credentials` on every subsequent call.
    pub fn set_authorization(&self, credentials: BasicCredentials) {
        *self.authorization.write() = Some(credentials);
    }

    /// Stops sending credentials.
    pub fn clear_authorization(&self) {
        *self.authorization.write() = None;
    }

    /// Returns the connection span.
    #[must_use]
    pub const fn span(&self) -> &Span {
        &self.span
    }

    /// Sends raw bytes to `path`.
    ///
    /// # Errors
    /// Propagates transport failures.
    pub async fn call_raw(&self, path: &str, request: &[u8]) -> Result<Vec<u8>> {
        let options = CallOptions::new()
            .with_authorization(self.authorization.read().clone())
            .with_timeout(self.timeout);

        debug!(parent: &self.span, path, "Sending unattested request");
        let response = self
            .transport
            .call(path, request, &options)
            .instrument(self.span.clone())
            .await?;
        Ok(response)
    }

    /// Sends `request` to `path` and decodes the response.
    ///
    /// # Errors
    /// - Transport failures
    /// - `InvalidServerResponse`: the response is not a valid `Resp`
    pub async fn call<Req, Resp>(&self, path: &str, request: &Req) -> Result<Resp>
    where
        Req: Message,
        Resp: Message + Default,
    {
        let response = self.call_raw(path, &request.encode_to_vec()).await?;
        Resp::decode(response.as_slice())
            .map_err(|e| ClientError::invalid_response(format!("{path}: {e}")))
    }
}

impl fmt::Debug for UnattestedConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnattestedConnection")
            .field("authorized", &self.authorization.read().is_some())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::report::{Report, ReportRequest, ReportResponse};
    use mobattest_transport::mock::MockTransport;

    fn report_response() -> ReportResponse {
        ReportResponse {
            reports: vec![Report {
                fog_report_id: "A".into(),
                attestation_evidence: vec![],
                pubkey_expiry: 10,
                pubkey: vec![1, 2, 3],
            }],
        }
    }

    #[tokio::test]
    async fn test_typed_call() {
        let mock = Arc::new(MockTransport::new(|_, _| Ok(report_response().encode_to_vec())));
        let conn = UnattestedConnection::new("fog_report", mock.clone());

        let response: ReportResponse = conn.call("/report", &ReportRequest {}).await.unwrap();
        assert_eq!(response, report_response());
        assert_eq!(mock.call_count("/report"), 1);
    }

    #[tokio::test]
    async fn test_undecodable_response() {
        let mock = Arc::new(MockTransport::new(|_, _| Ok(vec![0xff; 3])));
        let conn = UnattestedConnection::new("fog_report", mock);

        let err = conn
            .call::<_, ReportResponse>("/report", &ReportRequest {})
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidServerResponse { .. }));
    }

    #[tokio::test]
    async fn test_authorization_toggles() {
        let mock = Arc::new(MockTransport::new(|_, _| Ok(Vec::new())));
        let conn = UnattestedConnection::new("fog_block", mock.clone())
            .with_timeout(Duration::from_secs(5));

        conn.set_authorization(BasicCredentials::new("alice", "s3cret"));
        conn.call_raw("/blocks", b"").await.unwrap();
        conn.clear_authorization();
        conn.call_raw("/blocks", b"").await.unwrap();

        let calls = mock.calls();
        assert_eq!(calls[0].authorization.as_deref(), Some("Basic YWxpY2U6czNjcmV0"));
        assert_eq!(calls[0].timeout, Some(Duration::from_secs(5)));
        assert!(calls[1].authorization.is_none());
    }
}
