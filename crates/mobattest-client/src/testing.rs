// ============================================
// File: crates/mobattest-client/src/testing.rs
// ============================================
//! # Test Enclave
//!
//! `FakeEnclave` answers handshakes through `EnclaveResponder` and
//! serves attested requests with an application handler. Counters and
//! fault switches let tests observe retries and force failures.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use prost::Message;
use rand::rngs::StdRng;
use rand::SeedableRng;

use mobattest_common::{Measurement, ResponderId};
use mobattest_core::ake::EnclaveResponder;
use mobattest_core::testing;
use mobattest_core::{AttestedMessage, AuthMessage, Cipher};
use mobattest_transport::mock::MockTransport;
use mobattest_transport::TransportError;

type AppHandler = dyn Fn(&str, &[u8]) -> Vec<u8> + Send + Sync;

/// Responder id used by fake enclaves.
pub const FAKE_RESPONDER: &str = "fog-view.example.com";

/// Server side of the attested protocol, in memory.
pub struct FakeEnclave {
    responder: EnclaveResponder,
    auth_path: &'static str,
    rng: Mutex<StdRng>,
    session: Mutex<Option<Arc<Cipher>>>,
    app: Box<AppHandler>,
    handshakes: AtomicUsize,
    requests: AtomicUsize,
    corrupt_next: AtomicUsize,
    unauthenticated_next: AtomicUsize,
    wrong_aad: AtomicBool,
}

impl FakeEnclave {
    /// Creates an enclave running `mr_enclave` that echoes request plaintext.
    pub fn echo(auth_path: &'static str, mr_enclave: Measurement) -> Arc<Self> {
        Self::new(auth_path, mr_enclave, |_, request| request.to_vec())
    }

    /// Creates an enclave running `mr_enclave` that answers with `app`.
    pub fn new<F>(auth_path: &'static str, mr_enclave: Measurement, app: F) -> Arc<Self>
    where
        F: Fn(&str, &[u8]) -> Vec<u8> + Send + Sync + 'static,
    {
        let responder_id = ResponderId::new(FAKE_RESPONDER).unwrap();
        Arc::new(Self {
            responder: testing::responder(&responder_id, mr_enclave).unwrap(),
            auth_path,
            rng: Mutex::new(StdRng::seed_from_u64(42)),
            session: Mutex::new(None),
            app: Box::new(app),
            handshakes: AtomicUsize::new(0),
            requests: AtomicUsize::new(0),
            corrupt_next: AtomicUsize::new(0),
            unauthenticated_next: AtomicUsize::new(0),
            wrong_aad: AtomicBool::new(false),
        })
    }

    /// Returns a mock transport routed to this enclave.
    pub fn transport(self: &Arc<Self>) -> MockTransport {
        let enclave = Arc::clone(self);
        MockTransport::new(move |path, request| enclave.handle(path, request))
    }

    /// Handshakes served.
    pub fn handshakes(&self) -> usize {
        self.handshakes.load(Ordering::SeqCst)
    }

    /// Attested requests received.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Corrupts the ciphertext of the next `n` responses.
    pub fn corrupt_next(&self, n: usize) {
        self.corrupt_next.store(n, Ordering::SeqCst);
    }

    /// Rejects the next `n` requests as unauthenticated.
    pub fn unauthenticated_next(&self, n: usize) {
        self.unauthenticated_next.store(n, Ordering::SeqCst);
    }

    /// Seals responses under a different AAD than the request's.
    pub fn send_wrong_aad(&self, enabled: bool) {
        self.wrong_aad.store(enabled, Ordering::SeqCst);
    }

    /// Drops the server-side session, as after an enclave restart.
    pub fn forget_session(&self) {
        *self.session.lock() = None;
    }

    fn take_one(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    /// Serves one call.
    pub fn handle(&self, path: &str, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        if path == self.auth_path {
            return self.handshake(path, request);
        }

        self.requests.fetch_add(1, Ordering::SeqCst);
        if Self::take_one(&self.unauthenticated_next) {
            return Err(TransportError::unauthenticated(path));
        }

        let cipher = self
            .session
            .lock()
            .clone()
            .ok_or_else(|| TransportError::unauthenticated(path))?;
        let message = AttestedMessage::decode(request)
            .map_err(|e| TransportError::status(path, 400, e.to_string()))?;
        if !message.is_for_channel(&cipher) {
            return Err(TransportError::unauthenticated(path));
        }
        let plaintext = message
            .open(&cipher)
            .map_err(|_| TransportError::unauthenticated(path))?;

        let reply = (self.app)(path, &plaintext);
        let aad = if self.wrong_aad.load(Ordering::SeqCst) {
            b"tampered".to_vec()
        } else {
            message.aad.clone()
        };
        let mut sealed = AttestedMessage::seal(&cipher, &aad, &reply)
            .map_err(|e| TransportError::status(path, 500, e.to_string()))?;
        if Self::take_one(&self.corrupt_next) {
            if let Some(last) = sealed.data.last_mut() {
                *last ^= 0x01;
            }
        }
        Ok(sealed.encode_to_vec())
    }

    fn handshake(&self, path: &str, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        self.handshakes.fetch_add(1, Ordering::SeqCst);
        let auth = AuthMessage::decode(request)
            .map_err(|e| TransportError::status(path, 400, e.to_string()))?;
        let (response, cipher) = self
            .responder
            .respond(&auth, &mut *self.rng.lock())
            .map_err(|e| TransportError::status(path, 400, e.to_string()))?;
        *self.session.lock() = Some(Arc::new(cipher));
        Ok(response.encode_to_vec())
    }
}
