// ============================================
// File: crates/mobattest-core/src/ake/responder.rs
// ============================================
//! # Enclave Responder
//!
//! ## Creation Reason
//! The enclave side of the handshake. Clients never run it in
//! production; it backs in-process fakes of the attested services and
//! keeps both halves of the key schedule in one crate.
//!
//! ## Main Functionality
//! - `EnclaveResponder::provision`: Generates a static key, binds it into
//!   a report and has the authority sign the evidence
//! - `EnclaveResponder::respond`: Answers an auth request and returns the
//!   responder's session cipher
//!
//! ## Last Modified
//! v0.1.0 - Initial responder

use rand::{CryptoRng, RngCore};
use tracing::debug;

use mobattest_common::ResponderId;

use super::transcript_hash;
use crate::attest::{EnclaveReport, SignedEvidence};
use crate::crypto::kdf::derive_session;
use crate::crypto::{AuthoritySigningKey, Cipher, CipherRole, ExchangeKeyPair};
use crate::error::AkeError;
use crate::protocol::{
    AuthMessage, AuthRequestFrame, AuthResponseFrame, HandshakeCodec, HANDSHAKE_VERSION,
};

/// Answers auth requests on behalf of one enclave service.
#[derive(Debug, Clone)]
pub struct EnclaveResponder {
    responder_id: ResponderId,
    identity: ExchangeKeyPair,
    evidence: Vec<u8>,
}

impl EnclaveResponder {
    /// Creates a responder from an identity key and pre-encoded evidence.
    ///
    /// The evidence is sent as-is; nothing checks that it binds `identity`.
    #[must_use]
    pub fn new(responder_id: ResponderId, identity: ExchangeKeyPair, evidence: Vec<u8>) -> Self {
        Self {
            responder_id,
            identity,
            evidence,
        }
    }

    /// Generates an identity key, binds it into `report` and signs the
    /// evidence with `authority`.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the report cannot be encoded.
    pub fn provision<R: RngCore + CryptoRng + ?Sized>(
        responder_id: ResponderId,
        mut report: EnclaveReport,
        authority: &AuthoritySigningKey,
        rng: &mut R,
    ) -> Result<Self, AkeError> {
        let identity = ExchangeKeyPair::generate(rng);
        report.bind_key(&identity.public_key_bytes());
        let evidence = SignedEvidence::sign(&report, authority)
            .map_err(|e| AkeError::invalid_input(e.to_string()))?
            .to_bytes();
        Ok(Self::new(responder_id, identity, evidence))
    }

    /// Returns the responder id this enclave answers to.
    #[must_use]
    pub const fn responder_id(&self) -> &ResponderId {
        &self.responder_id
    }

    /// Returns the static public key bound by the evidence.
    #[must_use]
    pub fn identity_public_key(&self) -> [u8; 32] {
        self.identity.public_key_bytes()
    }

    /// Returns the encoded evidence.
    #[must_use]
    pub fn evidence(&self) -> &[u8] {
        &self.evidence
    }

    /// Answers an auth request.
    ///
    /// # Returns
    /// The auth response and the responder's session cipher.
    ///
    /// # Errors
    /// - `InvalidInput`: the request is malformed or addressed elsewhere
    /// - `KeyExchange`: the initiator's key is unusable
    pub fn respond<R: RngCore + CryptoRng + ?Sized>(
        &self,
        request: &AuthMessage,
        rng: &mut R,
    ) -> Result<(AuthMessage, Cipher), AkeError> {
        let codec = HandshakeCodec::new();
        let frame: AuthRequestFrame = codec
            .from_slice(&request.data)
            .map_err(|e| AkeError::invalid_input(format!("malformed auth request: {e}")))?;
        if frame.responder_id != self.responder_id {
            return Err(AkeError::invalid_input(format!(
                "auth request for {} reached {}",
                frame.responder_id, self.responder_id
            )));
        }

        let ephemeral = ExchangeKeyPair::generate(rng);
        let mut response = AuthResponseFrame {
            version: HANDSHAKE_VERSION,
            responder_static: self.identity.public_key_bytes(),
            responder_ephemeral: ephemeral.public_key_bytes(),
            evidence: self.evidence.clone(),
            confirmation: Vec::new(),
        };

        let transcript = transcript_hash(&request.data, &response);
        let dh_ee = ephemeral.diffie_hellman(&frame.initiator_ephemeral)?;
        let dh_es = self.identity.diffie_hellman(&frame.initiator_ephemeral)?;
        let (key, channel_id) = derive_session(&dh_ee, &dh_es, &transcript)?;

        let cipher = Cipher::new(key, channel_id, CipherRole::Responder);
        response.confirmation = cipher
            .encrypt(&transcript, &[])
            .map_err(|_| AkeError::KeyExchange {
                reason: "failed to seal key confirmation",
            })?;

        let data = codec
            .to_vec(&response)
            .map_err(|e| AkeError::invalid_input(e.to_string()))?;

        debug!(
            responder_id = %self.responder_id,
            channel = %cipher.channel_id(),
            "Auth request answered"
        );
        Ok((AuthMessage::new(data), cipher))
    }
}
