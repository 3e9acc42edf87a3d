// ============================================
// File: crates/mobattest-client/src/services/connection.rs
// ============================================
//! # Attested Connection
//!
//! ## Creation Reason
//! Presents a plain request/response interface to one enclave service,
//! while every payload on the wire is attested and encrypted.
//!
//! ## Main Functionality
//! - Lazy handshake on first use (single-flight per connection)
//! - Request sealing into `AttestedMessage` envelopes
//! - Response checks: channel binding, AEAD, strict AAD equality
//! - Only frames sealed by the enclave, each opened once (reflected or
//!   replayed frames fail as `Aead`)
//! - Exactly one re-attestation retry on session failure
//!
//! ## Call Flow
//! ```text
//! call_raw ──► ensure_attested ──► seal ──► transport ──► open ──► Ok
//!                   │                                      │
//!            (gate, recheck,                      Aead / channel /
//!             auth round trip)                    Unauthenticated
//!                                                          │
//!                                          deattest_if_current, retry once
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - `ake` is a parking_lot mutex and must never be held across `.await`
//! - `attest_gate` is held across the auth round trip only, never across
//!   an application request
//! - A failing call only resets the session it used (pointer comparison);
//!   a session established meanwhile by another caller survives
//! - Transport errors and timeouts never trigger the retry
//!
//! ## Last Modified
//! v0.1.0 - Initial attested connection

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use prost::Message;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, info_span, warn, Instrument, Span};

use mobattest_common::ResponderId;
use mobattest_core::attest::AttestationVerifier;
use mobattest_core::{AkeStateMachine, AttestedMessage, AuthMessage, Cipher};
use mobattest_transport::{BasicCredentials, CallOptions, Transport};

use crate::error::{ClientError, Result};

/// Attempts per call: the first try plus one after re-attestation.
pub const MAX_ATTEMPTS: usize = 2;

// ============================================
// ServiceDescriptor
// ============================================

/// Static description of an attested service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Name used in logs.
    pub name: &'static str,
    /// Method path of the handshake.
    pub auth_path: &'static str,
}

impl ServiceDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub const fn new(name: &'static str, auth_path: &'static str) -> Self {
        Self { name, auth_path }
    }
}

// ============================================
// AttestedConnection
// ============================================

/// Connection to one enclave service.
pub struct AttestedConnection {
    service: ServiceDescriptor,
    responder_id: ResponderId,
    verifier: Arc<AttestationVerifier>,
    transport: Arc<dyn Transport>,
    ake: Mutex<AkeStateMachine>,
    attest_gate: tokio::sync::Mutex<()>,
    rng: Mutex<StdRng>,
    authorization: RwLock<Option<BasicCredentials>>,
    timeout: Option<Duration>,
    span: Span,
}

impl AttestedConnection {
    /// Creates an unattested connection.
    pub fn new(
        service: ServiceDescriptor,
        responder_id: ResponderId,
        verifier: Arc<AttestationVerifier>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let span = info_span!(
            "attested_connection",
            service = service.name,
            responder_id = %responder_id
        );
        Self {
            service,
            responder_id,
            verifier,
            transport,
            ake: Mutex::new(AkeStateMachine::new()),
            attest_gate: tokio::sync::Mutex::new(()),
            rng: Mutex::new(StdRng::from_entropy()),
            authorization: RwLock::new(None),
            timeout: None,
            span,
        }
    }

    /// Replaces the handshake randomness source.
    #[must_use]
    pub fn with_rng(self, rng: StdRng) -> Self {
        *self.rng.lock() = rng;
        self
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

    /// Returns the service description.
    #[must_use]
    pub const fn service(&self) -> &ServiceDescriptor {
        &self.service
    }

    /// Returns the responder this connection attests.
    #[must_use]
    pub const fn responder_id(&self) -> &ResponderId {
        &self.responder_id
    }

    /// Sends `credentials` on every subsequent call, handshakes included.
    pub fn set_authorization(&self, credentials: BasicCredentials) {
        *self.authorization.write() = Some(credentials);
    }

    /// Stops sending credentials.
    pub fn clear_authorization(&self) {
        *self.authorization.write() = None;
    }

    /// Returns `true` if a session is established.
    #[must_use]
    pub fn is_attested(&self) -> bool {
        self.ake.lock().is_attested()
    }

    /// Discards the current session; the next call re-attests.
    pub fn deattest(&self) {
        self.ake.lock().deattest();
    }

    /// Returns the cipher of the current session.
    #[must_use]
    pub fn current_cipher(&self) -> Option<Arc<Cipher>> {
        self.ake.lock().cipher().cloned()
    }

    fn options(&self) -> CallOptions {
        CallOptions::new()
            .with_authorization(self.authorization.read().clone())
            .with_timeout(self.timeout)
    }

    fn deattest_if_current(&self, cipher: &Arc<Cipher>) {
        let mut ake = self.ake.lock();
        if ake.cipher().is_some_and(|current| Arc::ptr_eq(current, cipher)) {
            ake.deattest();
        }
    }

    /// Returns the session cipher, running the handshake if needed.
    ///
    /// Concurrent callers on an unattested connection wait for a single
    /// handshake and share its session.
    ///
    /// # Errors
    /// - `Attestation`: the handshake failed (no request was sent)
    /// - `Transport` / `InvalidServerResponse`: the auth round trip failed
    pub async fn ensure_attested(&self) -> Result<Arc<Cipher>> {
        if let Some(cipher) = self.current_cipher() {
            return Ok(cipher);
        }

        let _gate = self.attest_gate.lock().await;
        if let Some(cipher) = self.current_cipher() {
            return Ok(cipher);
        }

        let request = {
            let mut rng = self.rng.lock();
            self.ake
                .lock()
                .auth_begin_request(&self.responder_id, &mut *rng)?
        };

        debug!(parent: &self.span, path = self.service.auth_path, "Sending auth request");
        let response = self
            .transport
            .call(self.service.auth_path, &request.encode_to_vec(), &self.options())
            .instrument(self.span.clone())
            .await;

        let response = match response {
            Ok(bytes) => bytes,
            Err(e) => {
                self.ake.lock().deattest();
                return Err(e.into());
            }
        };

        let auth = match AuthMessage::decode(response.as_slice()) {
            Ok(auth) => auth,
            Err(e) => {
                self.ake.lock().deattest();
                return Err(ClientError::invalid_response(format!(
                    "{}: {e}",
                    self.service.auth_path
                )));
            }
        };

        let cipher = self.ake.lock().auth_end(&auth, &self.verifier)?;
        info!(parent: &self.span, channel = %cipher.channel_id(), "Connection attested");
        Ok(cipher)
    }

    /// Sends `request` with `aad` to `path` and returns the response
    /// plaintext.
    ///
    /// The response AAD must equal `aad`, so it is not returned.
    ///
    /// # Errors
    /// - `Attestation`: the handshake failed
    /// - `Aead` / `ChannelMismatch` / unauthenticated `Transport`: the
    ///   session failed twice in a row
    /// - `AadMismatch` / `InvalidServerResponse`: the server answered
    ///   something it should not have (no retry)
    /// - `Transport`: network failure (no retry, session untouched)
    pub async fn call_raw(&self, path: &str, aad: &[u8], request: &[u8]) -> Result<Vec<u8>> {
        let mut attempt = 1;
        loop {
            let cipher = self.ensure_attested().await?;
            match self.exchange(&cipher, path, aad, request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.requires_reattestation() => {
                    self.deattest_if_current(&cipher);
                    if attempt >= MAX_ATTEMPTS {
                        warn!(parent: &self.span, path, attempt, error = %e, "Attested call failed after re-attestation");
                        return Err(e);
                    }
                    warn!(parent: &self.span, path, attempt, error = %e, "Session rejected, re-attesting");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Sends a protobuf request and decodes the protobuf response.
    ///
    /// # Errors
    /// See [`AttestedConnection::call_raw`]; an undecodable plaintext is
    /// `InvalidServerResponse`.
    pub async fn call<Req, Resp>(&self, path: &str, aad: &[u8], request: &Req) -> Result<Resp>
    where
        Req: Message,
        Resp: Message + Default,
    {
        let plaintext = self.call_raw(path, aad, &request.encode_to_vec()).await?;
        Resp::decode(plaintext.as_slice())
            .map_err(|e| ClientError::invalid_response(format!("{path}: {e}")))
    }

    async fn exchange(
        &self,
        cipher: &Cipher,
        path: &str,
        aad: &[u8],
        request: &[u8],
    ) -> Result<Vec<u8>> {
        let envelope = AttestedMessage::seal(cipher, aad, request)?;

        debug!(parent: &self.span, path, "Sending attested request");
        let response = self
            .transport
            .call(path, &envelope.encode_to_vec(), &self.options())
            .instrument(self.span.clone())
            .await?;

        let message = AttestedMessage::decode(response.as_slice())
            .map_err(|e| ClientError::invalid_response(format!("{path}: {e}")))?;
        if !message.is_for_channel(cipher) {
            return Err(ClientError::ChannelMismatch);
        }
        let plaintext = message.open(cipher)?;
        if message.aad != aad {
            return Err(ClientError::AadMismatch);
        }
        Ok(plaintext)
    }
}

impl fmt::Debug for AttestedConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttestedConnection")
            .field("service", &self.service.name)
            .field("responder_id", &self.responder_id)
            .field("attested", &self.is_attested())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::api::consensus::{ProposeTxRequest, ProposeTxResponse};
    use crate::error::ErrorClass;
    use crate::testing::{FakeEnclave, FAKE_RESPONDER};
    use mobattest_common::Measurement;
    use mobattest_core::testing;
    use mobattest_core::{AeadError, AkeError};
    use mobattest_transport::mock::MockTransport;
    use mobattest_transport::{TimeoutTransport, TransportError};

    const AUTH: &str = "/test.Api/Auth";
    const CALL: &str = "/test.Api/Call";

    fn connection(transport: Arc<dyn Transport>) -> AttestedConnection {
        AttestedConnection::new(
            ServiceDescriptor::new("test", AUTH),
            ResponderId::new(FAKE_RESPONDER).unwrap(),
            Arc::new(testing::verifier_for(testing::deadbeef())),
            transport,
        )
        .with_rng(StdRng::from_seed([3u8; 32]))
    }

    fn setup() -> (Arc<FakeEnclave>, Arc<MockTransport>, AttestedConnection) {
        let enclave = FakeEnclave::echo(AUTH, testing::deadbeef());
        let mock = Arc::new(enclave.transport());
        let conn = connection(mock.clone());
        (enclave, mock, conn)
    }

    #[tokio::test]
    async fn test_first_call_attests() {
        let (enclave, mock, conn) = setup();
        assert!(!conn.is_attested());

        let response = conn.call_raw(CALL, b"meta", b"ping").await.unwrap();
        assert_eq!(response, b"ping");
        assert!(conn.is_attested());

        conn.call_raw(CALL, b"", b"pong").await.unwrap();
        assert_eq!(enclave.handshakes(), 1);
        assert_eq!(mock.call_count(AUTH), 1);
        assert_eq!(mock.call_count(CALL), 2);
    }

    #[tokio::test]
    async fn test_single_failure_reattests_once() {
        let (enclave, mock, conn) = setup();
        enclave.corrupt_next(1);

        let response = conn.call_raw(CALL, b"", b"ping").await.unwrap();
        assert_eq!(response, b"ping");
        assert_eq!(mock.call_count(AUTH), 2);
        assert_eq!(mock.call_count(CALL), 2);
    }

    #[tokio::test]
    async fn test_second_failure_is_terminal() {
        let (enclave, mock, conn) = setup();
        enclave.corrupt_next(2);

        let err = conn.call_raw(CALL, b"", b"ping").await.unwrap_err();
        assert!(matches!(err, ClientError::Aead(_)));
        assert_eq!(err.class(), ErrorClass::AttestationTrust);
        assert_eq!(mock.call_count(AUTH), 2);
        assert_eq!(mock.call_count(CALL), 2);
        assert!(!conn.is_attested());
    }

    #[tokio::test]
    async fn test_lost_server_session_reattests() {
        let (enclave, mock, conn) = setup();
        conn.call_raw(CALL, b"", b"one").await.unwrap();

        enclave.forget_session();
        let response = conn.call_raw(CALL, b"", b"two").await.unwrap();
        assert_eq!(response, b"two");
        assert_eq!(mock.call_count(AUTH), 2);
        assert_eq!(mock.call_count(CALL), 3);
    }

    #[tokio::test]
    async fn test_unauthenticated_twice_surfaces() {
        let (enclave, _mock, conn) = setup();
        enclave.unauthenticated_next(2);

        let err = conn.call_raw(CALL, b"", b"ping").await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Transport(TransportError::Unauthenticated { .. })
        ));
        assert_eq!(enclave.handshakes(), 2);
    }

    #[tokio::test]
    async fn test_aad_mismatch_not_retried() {
        let (enclave, mock, conn) = setup();
        enclave.send_wrong_aad(true);

        let err = conn.call_raw(CALL, b"cursor", b"ping").await.unwrap_err();
        assert_eq!(err, ClientError::AadMismatch);
        assert_eq!(err.class(), ErrorClass::MalformedResponse);
        assert_eq!(mock.call_count(AUTH), 1);
        assert_eq!(mock.call_count(CALL), 1);
        assert!(conn.is_attested());
    }

    #[tokio::test]
    async fn test_undecodable_plaintext() {
        let enclave = FakeEnclave::new(AUTH, testing::deadbeef(), |_, _| vec![0xff; 3]);
        let mock = Arc::new(enclave.transport());
        let conn = connection(mock.clone());

        let err = conn
            .call::<_, ProposeTxResponse>(CALL, b"", &ProposeTxRequest { tx: vec![1] })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidServerResponse { .. }));
        assert_eq!(mock.call_count(CALL), 1);
        assert!(conn.is_attested());
    }

    #[tokio::test]
    async fn test_typed_call() {
        let reply = ProposeTxResponse {
            result: 0,
            block_count: 12,
            block_version: 3,
            err_msg: String::new(),
        };
        let encoded = reply.encode_to_vec();
        let enclave = FakeEnclave::new(AUTH, testing::deadbeef(), move |_, _| encoded.clone());
        let mock = Arc::new(enclave.transport());
        let conn = connection(mock);

        let response: ProposeTxResponse = conn
            .call(CALL, b"", &ProposeTxRequest { tx: vec![1, 2] })
            .await
            .unwrap();
        assert!(response.is_ok());
        assert_eq!(response.block_count, 12);
    }

    #[tokio::test]
    async fn test_transport_error_keeps_session() {
        let enclave = FakeEnclave::echo(AUTH, testing::deadbeef());
        let fail = Arc::new(AtomicBool::new(false));
        let (flag, server) = (Arc::clone(&fail), Arc::clone(&enclave));
        let mock = Arc::new(MockTransport::new(move |path, request| {
            if path == CALL && flag.load(Ordering::SeqCst) {
                return Err(TransportError::network(path, "connection reset"));
            }
            server.handle(path, request)
        }));
        let conn = connection(mock.clone());

        conn.call_raw(CALL, b"", b"ping").await.unwrap();
        let before = conn.current_cipher().unwrap();

        fail.store(true, Ordering::SeqCst);
        let err = conn.call_raw(CALL, b"", b"ping").await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(mock.call_count(CALL), 2);
        assert!(Arc::ptr_eq(&before, &conn.current_cipher().unwrap()));
        assert_eq!(enclave.handshakes(), 1);
    }

    #[tokio::test]
    async fn test_timeout_keeps_session() {
        let enclave = FakeEnclave::echo(AUTH, testing::deadbeef());
        let slow = enclave
            .transport()
            .with_path_latency(CALL, Duration::from_millis(200));
        let transport = Arc::new(TimeoutTransport::new(slow, Duration::from_secs(5)));
        let conn = connection(transport.clone()).with_timeout(Duration::from_millis(20));

        let before = conn.ensure_attested().await.unwrap();
        let err = conn.call_raw(CALL, b"", b"ping").await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Transport(TransportError::Timeout { after_ms: 20, .. })
        ));
        assert!(err.is_retryable());
        assert!(!err.requires_reattestation());
        assert_eq!(transport.inner().call_count(CALL), 1);
        assert_eq!(enclave.handshakes(), 1);
        assert!(Arc::ptr_eq(&before, &conn.current_cipher().unwrap()));
    }

    #[tokio::test]
    async fn test_reflected_request_rejected() {
        let enclave = FakeEnclave::echo(AUTH, testing::deadbeef());
        let server = Arc::clone(&enclave);
        let mock = Arc::new(MockTransport::new(move |path, request| {
            if path == CALL {
                return Ok(request.to_vec());
            }
            server.handle(path, request)
        }));
        let conn = connection(mock.clone());

        let err = conn
            .call_raw(CALL, b"", b"client-secret-request")
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::Aead(AeadError::Aead));
        assert_eq!(mock.call_count(AUTH), 2);
        assert_eq!(mock.call_count(CALL), 2);
        assert!(!conn.is_attested());
    }

    #[tokio::test]
    async fn test_replayed_response_rejected() {
        let enclave = FakeEnclave::echo(AUTH, testing::deadbeef());
        let server = Arc::clone(&enclave);
        let captured: Arc<Mutex<Option<Vec<u8>>>> = Arc::default();
        let replay = Arc::new(AtomicBool::new(false));
        let (slot, flag) = (Arc::clone(&captured), Arc::clone(&replay));
        let mock = Arc::new(MockTransport::new(move |path, request| {
            if path == CALL && flag.swap(false, Ordering::SeqCst) {
                if let Some(old) = slot.lock().clone() {
                    return Ok(old);
                }
            }
            let response = server.handle(path, request)?;
            if path == CALL {
                let mut first = slot.lock();
                if first.is_none() {
                    *first = Some(response.clone());
                }
            }
            Ok(response)
        }));
        let conn = connection(mock.clone());

        assert_eq!(conn.call_raw(CALL, b"", b"balance?1").await.unwrap(), b"balance?1");
        let first_session = conn.current_cipher().unwrap();

        replay.store(true, Ordering::SeqCst);
        let response = conn.call_raw(CALL, b"", b"balance?2").await.unwrap();
        assert_eq!(response, b"balance?2");
        assert_eq!(enclave.handshakes(), 2);
        assert_eq!(mock.call_count(CALL), 3);
        assert!(!Arc::ptr_eq(&first_session, &conn.current_cipher().unwrap()));
    }

    #[tokio::test]
    async fn test_policy_rejection_skips_request() {
        let enclave = FakeEnclave::echo(AUTH, Measurement::new([0x11; 32]));
        let mock = Arc::new(enclave.transport());
        let conn = connection(mock.clone());

        let err = conn.call_raw(CALL, b"", b"ping").await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Attestation(AkeError::AttestationVerificationFailed(_))
        ));
        assert_eq!(err.class(), ErrorClass::AttestationTrust);
        assert_eq!(mock.call_count(CALL), 0);
        assert!(!conn.is_attested());

        // The connection stays usable for another handshake.
        conn.call_raw(CALL, b"", b"ping").await.unwrap_err();
        assert_eq!(mock.call_count(AUTH), 2);
    }

    #[tokio::test]
    async fn test_authorization_sent_everywhere() {
        let (_enclave, mock, conn) = setup();
        conn.set_authorization(BasicCredentials::new("alice", "s3cret"));

        conn.call_raw(CALL, b"", b"ping").await.unwrap();
        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        for call in &calls {
            assert_eq!(call.authorization.as_deref(), Some("Basic YWxpY2U6czNjcmV0"));
        }

        conn.clear_authorization();
        conn.call_raw(CALL, b"", b"ping").await.unwrap();
        assert!(mock.calls()[2].authorization.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_share_one_handshake() {
        let enclave = FakeEnclave::echo(AUTH, testing::deadbeef());
        let mock = Arc::new(enclave.transport().with_latency(Duration::from_millis(20)));
        let conn = Arc::new(connection(mock.clone()));

        let tasks: Vec<_> = (0..8u8)
            .map(|i| {
                let conn = Arc::clone(&conn);
                tokio::spawn(async move { conn.call_raw(CALL, b"", &[i]).await })
            })
            .collect();

        for (i, task) in tasks.into_iter().enumerate() {
            assert_eq!(task.await.unwrap().unwrap(), vec![i as u8]);
        }
        assert_eq!(mock.call_count(AUTH), 1);
        assert_eq!(enclave.handshakes(), 1);
        assert_eq!(mock.call_count(CALL), 8);
    }
}
