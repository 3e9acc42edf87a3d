// ============================================
// File: crates/mobattest-core/src/ake/state.rs
// ============================================
//! # AKE State Machine
//!
//! ## Creation Reason
//! Tracks whether a connection is unattested, mid-handshake or attested,
//! and forbids cipher use outside the attested state.
//!
//! ## Main Functionality
//! - `SessionState`: Tagged session state
//! - `HandshakeContext`: Ephemeral secret and request bytes of a pending handshake
//! - `AkeStateMachine`: `auth_begin_request`, `auth_end`, `deattest`
//!
//! ## auth_end Checks (in order)
//! 1. Decode the response frame
//! 2. Verify the evidence with the `AttestationVerifier`
//! 3. Require the report to bind the responder's static key
//! 4. Derive the session key over the transcript
//! 5. Open the key confirmation under the derived key
//!
//! ## ⚠️ Important Note for Next Developer
//! - The machine is not internally synchronized; the owning connection
//!   wraps it in a mutex
//! - Randomness only comes from the `rng` argument
//!
//! ## Last Modified
//! v0.1.0 - Initial state machine

use std::mem;
use std::sync::Arc;

use rand::{CryptoRng, RngCore};
use tracing::{debug, info, warn};

use mobattest_common::ResponderId;

use super::transcript_hash;
use crate::attest::AttestationVerifier;
use crate::crypto::kdf::derive_session;
use crate::crypto::{Cipher, CipherRole, ExchangeKeyPair};
use crate::error::{AkeError, VerificationError};
use crate::protocol::{
    AuthMessage, AuthRequestFrame, AuthResponseFrame, HandshakeCodec, HANDSHAKE_VERSION,
};

// ============================================
// HandshakeContext
// ============================================

/// State held between `auth_begin_request` and `auth_end`.
#[derive(Debug)]
pub struct HandshakeContext {
    responder_id: ResponderId,
    ephemeral: ExchangeKeyPair,
    request_bytes: Vec<u8>,
}

impl HandshakeContext {
    /// Returns the responder this handshake is addressed to.
    #[must_use]
    pub const fn responder_id(&self) -> &ResponderId {
        &self.responder_id
    }
}

// ============================================
// SessionState
// ============================================

/// Session state of one logical connection.
#[derive(Debug, Default)]
pub enum SessionState {
    /// No session.
    #[default]
    Unattested,
    /// Auth request issued, waiting for the response.
    Pending(HandshakeContext),
    /// Handshake completed.
    Attested {
        /// Verified responder.
        responder_id: ResponderId,
        /// Session cipher.
        cipher: Arc<Cipher>,
    },
}

impl SessionState {
    /// Returns a short name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Unattested => "unattested",
            Self::Pending(_) => "pending",
            Self::Attested { .. } => "attested",
        }
    }
}

// ============================================
// AkeStateMachine
// ============================================

/// Initiator side of the attestation handshake.
///
/// # Example
/// ```ignore
/// let mut ake = AkeStateMachine::new();
/// let request = ake.auth_begin_request(&responder_id, &mut rng)?;
/// let response = transport.call("/attest.AttestedApi/Auth", &request).await?;
/// let cipher = ake.auth_end(&response, &verifier)?;
/// ```
#[derive(Debug, Default)]
pub struct AkeStateMachine {
    state: SessionState,
}

impl AkeStateMachine {
    /// Creates an unattested state machine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns `true` once a handshake has completed.
    #[must_use]
    pub const fn is_attested(&self) -> bool {
        matches!(self.state, SessionState::Attested { .. })
    }

    /// Returns `true` while an auth request is outstanding.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, SessionState::Pending(_))
    }

    /// Returns the session cipher while attested.
    #[must_use]
    pub const fn cipher(&self) -> Option<&Arc<Cipher>> {
        match &self.state {
            SessionState::Attested { cipher, .. } => Some(cipher),
            _ => None,
        }
    }

    /// Returns the verified responder while attested.
    #[must_use]
    pub const fn responder_id(&self) -> Option<&ResponderId> {
        match &self.state {
            SessionState::Attested { responder_id, .. } => Some(responder_id),
            _ => None,
        }
    }

    /// Forces the machine back to `Unattested`, discarding any session.
    pub fn deattest(&mut self) {
        if !matches!(self.state, SessionState::Unattested) {
            debug!(from = self.state.name(), "Deattesting session");
        }
        self.state = SessionState::Unattested;
    }

    /// Starts a handshake with `responder_id`.
    ///
    /// A pending handshake is replaced; only one is ever in flight.
    ///
    /// # Errors
    /// Returns `InvalidInput` while attested (call `deattest` first).
    pub fn auth_begin_request<R: RngCore + CryptoRng + ?Sized>(
        &mut self,
        responder_id: &ResponderId,
        rng: &mut R,
    ) -> Result<AuthMessage, AkeError> {
        match &self.state {
            SessionState::Attested { .. } => {
                return Err(AkeError::invalid_input(
                    "auth_begin_request called on an attested session",
                ));
            }
            SessionState::Pending(previous) => {
                debug!(
                    responder_id = %previous.responder_id,
                    "Replacing pending handshake"
                );
            }
            SessionState::Unattested => {}
        }

        let ephemeral = ExchangeKeyPair::generate(rng);
        let frame = AuthRequestFrame {
            version: HANDSHAKE_VERSION,
            initiator_ephemeral: ephemeral.public_key_bytes(),
            responder_id: responder_id.clone(),
        };
        let request_bytes = HandshakeCodec::new()
            .to_vec(&frame)
            .map_err(|e| AkeError::invalid_input(e.to_string()))?;

        debug!(responder_id = %responder_id, "Auth request built");

        self.state = SessionState::Pending(HandshakeContext {
            responder_id: responder_id.clone(),
            ephemeral,
            request_bytes: request_bytes.clone(),
        });
        Ok(AuthMessage::new(request_bytes))
    }

    /// Completes the handshake with the responder's answer.
    ///
    /// On success the machine is `Attested` and the returned cipher is the
    /// one [`AkeStateMachine::cipher`] hands out. On any failure other than
    /// misuse the machine is `Unattested`.
    ///
    /// # Errors
    /// - `InvalidInput`: no handshake pending (state unchanged)
    /// - `MalformedResponse`: the response frame does not decode
    /// - `AttestationVerificationFailed`: evidence rejected
    /// - `KeyExchange` / `KeyConfirmation`: the session key does not agree
    pub fn auth_end(
        &mut self,
        response: &AuthMessage,
        verifier: &AttestationVerifier,
    ) -> Result<Arc<Cipher>, AkeError> {
        let context = match mem::take(&mut self.state) {
            SessionState::Pending(context) => context,
            other => {
                let name = other.name();
                self.state = other;
                return Err(AkeError::invalid_input(format!(
                    "auth_end called while {name}"
                )));
            }
        };

        match Self::complete(&context, response, verifier) {
            Ok(cipher) => {
                let cipher = Arc::new(cipher);
                info!(
                    responder_id = %context.responder_id,
                    channel = %cipher.channel_id(),
                    "Attested session established"
                );
                self.state = SessionState::Attested {
                    responder_id: context.responder_id,
                    cipher: Arc::clone(&cipher),
                };
                Ok(cipher)
            }
            Err(e) => {
                warn!(
                    responder_id = %context.responder_id,
                    error = %e,
                    "Handshake failed"
                );
                Err(e)
            }
        }
    }

    fn complete(
        context: &HandshakeContext,
        response: &AuthMessage,
        verifier: &AttestationVerifier,
    ) -> Result<Cipher, AkeError> {
        let frame: AuthResponseFrame = HandshakeCodec::new().from_slice(&response.data)?;

        let report = verifier.verify_bytes(&frame.evidence)?;
        if !report.binds_key(&frame.responder_static) {
            return Err(VerificationError::IdentityBinding.into());
        }

        let transcript = transcript_hash(&context.request_bytes, &frame);
        let dh_ee = context.ephemeral.diffie_hellman(&frame.responder_ephemeral)?;
        let dh_es = context.ephemeral.diffie_hellman(&frame.responder_static)?;
        let (key, channel_id) = derive_session(&dh_ee, &dh_es, &transcript)?;

        let cipher = Cipher::new(key, channel_id, CipherRole::Initiator);
        let confirmation = cipher
            .decrypt_from_peer(&transcript, &frame.confirmation)
            .map_err(|_| AkeError::KeyConfirmation)?;
        if !confirmation.is_empty() {
            return Err(AkeError::KeyConfirmation);
        }

        Ok(cipher)
    }
}

// ============================================
// Tests
// ============================================
