// ============================================
// File: crates/mobattest-core/src/protocol/envelope.rs
// ============================================
//! # Protobuf Envelopes
//!
//! ## Creation Reason
//! Attested services exchange two protobuf envelopes: `AuthMessage` for
//! the handshake and `AttestedMessage` for every call made over an
//! attested channel.
//!
//! ## Main Functionality
//! - `AuthMessage`: Opaque handshake frame bytes
//! - `AttestedMessage`: AAD, channel binding and AEAD ciphertext
//!
//! ## ⚠️ Important Note for Next Developer
//! - Tag numbers are part of the wire contract with the enclave services
//! - `aad` travels in the clear; it is authenticated, not encrypted
//!
//! ## Last Modified
//! v0.1.0 - Initial envelopes

use crate::crypto::Cipher;
use crate::error::AeadError;

/// Handshake envelope.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuthMessage {
    /// Encoded `AuthRequestFrame` or `AuthResponseFrame`.
    #[prost(bytes = "vec", tag = "1")]
    pub data: Vec<u8>,
}

/// Encrypted call envelope.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AttestedMessage {
    /// Additional authenticated data, sent in the clear.
    #[prost(bytes = "vec", tag = "1")]
    pub aad: Vec<u8>,
    /// Channel binding of the session that sealed `data`.
    #[prost(bytes = "vec", tag = "2")]
    pub channel_id: Vec<u8>,
    /// AEAD frame.
    #[prost(bytes = "vec", tag = "3")]
    pub data: Vec<u8>,
}

impl AuthMessage {
    /// Wraps frame bytes.
    #[must_use]
    pub const fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl AttestedMessage {
    /// Seals `plaintext` under `cipher`, binding it to `aad` and the channel.
    ///
    /// # Errors
    /// Propagates cipher failures.
    pub fn seal(cipher: &Cipher, aad: &[u8], plaintext: &[u8]) -> Result<Self, AeadError> {
        let data = cipher.encrypt(aad, plaintext)?;
        Ok(Self {
            aad: aad.to_vec(),
            channel_id: cipher.channel_id().to_vec(),
            data,
        })
    }

    /// Opens a payload sealed by the other side of `cipher`'s session,
    /// authenticating the carried AAD.
    ///
    /// The channel id is not checked here; callers compare it first so a
    /// stale channel can be told apart from a forged frame.
    ///
    /// # Errors
    /// Returns `Aead` if authentication fails, or if the frame was sealed
    /// by `cipher`'s own side or was opened before.
    pub fn open(&self, cipher: &Cipher) -> Result<Vec<u8>, AeadError> {
        cipher.decrypt_from_peer(&self.aad, &self.data)
    }

    /// Returns `true` if this message was sealed for `cipher`'s channel.
    #[must_use]
    pub fn is_for_channel(&self, cipher: &Cipher) -> bool {
        self.channel_id.as_slice() == cipher.channel_id().as_bytes()
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use mobattest_common::ChannelId;
    use prost::Message;

    use super::*;
    use crate::crypto::{CipherRole, SessionKey};

    fn pair() -> (Cipher, Cipher) {
        let key = [9u8; 32];
        let channel = ChannelId::new([3u8; 32]);
        (
            Cipher::new(SessionKey::from_bytes(key), channel.clone(), CipherRole::Initiator),
            Cipher::new(SessionKey::from_bytes(key), channel, CipherRole::Responder),
        )
    }

    #[test]
    fn test_seal_open_across_wire() {
        let (client, server) = pair();
        let sealed = AttestedMessage::seal(&client, b"aad", b"request").unwrap();
        assert!(sealed.is_for_channel(&server));

        let wire = sealed.encode_to_vec();
        let received = AttestedMessage::decode(wire.as_slice()).unwrap();
        assert_eq!(received.aad, b"aad");
        assert_eq!(received.open(&server).unwrap(), b"request");
    }

    #[test]
    fn test_modified_aad_fails() {
        let (client, server) = pair();
        let mut sealed = AttestedMessage::seal(&client, b"aad", b"request").unwrap();
        sealed.aad = b"other".to_vec();
        assert_eq!(sealed.open(&server), Err(AeadError::Aead));
    }

    #[test]
    fn test_reflected_and_replayed_envelopes_fail() {
        let (client, server) = pair();
        let request = AttestedMessage::seal(&client, b"aad", b"request").unwrap();
        assert_eq!(request.open(&client), Err(AeadError::Aead));

        let response = AttestedMessage::seal(&server, b"aad", b"response").unwrap();
        assert_eq!(response.open(&client).unwrap(), b"response");
        assert_eq!(response.open(&client), Err(AeadError::Aead));
    }

    #[test]
    fn test_foreign_channel_detected() {
        let (client, _) = pair();
        let other = Cipher::new(
            SessionKey::from_bytes([9u8; 32]),
            ChannelId::new([4u8; 32]),
            CipherRole::Responder,
        );
        let sealed = AttestedMessage::seal(&client, b"", b"x").unwrap();
        assert!(!sealed.is_for_channel(&other));
    }

    #[test]
    fn test_auth_message_tag() {
        let encoded = AuthMessage::new(vec![0xaa, 0xbb]).encode_to_vec();
        // field 1, wire type 2, length 2
        assert_eq!(encoded, vec![0x0a, 0x02, 0xaa, 0xbb]);
    }
}
