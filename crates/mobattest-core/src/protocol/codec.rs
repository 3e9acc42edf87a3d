// ============================================
// File: crates/mobattest-core/src/protocol/codec.rs
// ============================================
//! # Handshake Codec
//!
//! ## Creation Reason
//! Provides binary serialization for the handshake frames.
//!
//! ## Parsing Strategy
//! 1. Check minimum frame length
//! 2. Read and check the type byte, then the version byte
//! 3. Read fixed fields, then length-prefixed fields with bound checks
//! 4. Reject trailing bytes
//!
//! ## ⚠️ Important Note for Next Developer
//! - Always validate buffer lengths before reading (`Buf` panics otherwise)
//! - Peer-declared lengths are bounded before allocation
//!
//! ## Last Modified
//! v0.1.0 - Initial codec implementation

use bytes::{Buf, BufMut, Bytes, BytesMut};

use mobattest_common::ResponderId;

use crate::crypto::X25519_PUBLIC_KEY_SIZE;
use crate::error::{CoreError, Result};
use crate::protocol::messages::{
    AuthRequestFrame, AuthResponseFrame, MessageType, AUTH_REQUEST_MIN_SIZE,
    AUTH_RESPONSE_MIN_SIZE, HANDSHAKE_VERSION, MAX_EVIDENCE_SIZE,
};

// ============================================
// Codec Trait
// ============================================

/// Trait for encoding and decoding handshake frames.
///
/// # Type Parameters
/// * `T` - The frame type to encode/decode
pub trait Codec<T> {
    /// Encodes a frame into a byte buffer.
    ///
    /// # Errors
    /// Returns an error if a field exceeds its length prefix.
    fn encode(&self, msg: &T, buf: &mut BytesMut) -> Result<()>;

    /// Decodes a frame from bytes.
    ///
    /// # Errors
    /// Returns a framing error for truncated or invalid input.
    fn decode(&self, buf: &mut Bytes) -> Result<T>;
}

// ============================================
// HandshakeCodec
// ============================================

/// Codec implementation for the handshake frames.
#[derive(Debug, Default, Clone, Copy)]
pub struct HandshakeCodec;

impl HandshakeCodec {
    /// Creates a new codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Encodes a frame into a fresh byte vector.
    ///
    /// # Errors
    /// See [`Codec::encode`].
    pub fn to_vec<T>(&self, msg: &T) -> Result<Vec<u8>>
    where
        Self: Codec<T>,
    {
        let mut buf = BytesMut::new();
        self.encode(msg, &mut buf)?;
        Ok(buf.to_vec())
    }

    /// Decodes a frame from a byte slice, rejecting trailing bytes.
    ///
    /// # Errors
    /// See [`Codec::decode`].
    pub fn from_slice<T>(&self, data: &[u8]) -> Result<T>
    where
        Self: Codec<T>,
    {
        let mut buf = Bytes::copy_from_slice(data);
        let msg = self.decode(&mut buf)?;
        if !buf.is_empty() {
            return Err(CoreError::malformed(format!(
                "{} trailing bytes after frame",
                buf.len()
            )));
        }
        Ok(msg)
    }

    fn read_header(buf: &mut Bytes, expected: MessageType, min_size: usize) -> Result<()> {
        if buf.len() < min_size {
            return Err(CoreError::too_short(min_size, buf.len()));
        }
        let message_type = buf.get_u8();
        if MessageType::from_byte(message_type) != Some(expected) {
            return Err(CoreError::UnknownMessageType(message_type));
        }
        let version = buf.get_u8();
        if version != HANDSHAKE_VERSION {
            return Err(CoreError::UnsupportedVersion {
                got: version,
                expected: HANDSHAKE_VERSION,
            });
        }
        Ok(())
    }

    fn read_key(buf: &mut Bytes) -> [u8; X25519_PUBLIC_KEY_SIZE] {
        let mut key = [0u8; X25519_PUBLIC_KEY_SIZE];
        buf.copy_to_slice(&mut key);
        key
    }

    fn read_prefixed(buf: &mut Bytes, len: usize, max: usize) -> Result<Bytes> {
        if len > max {
            return Err(CoreError::too_large(max, len));
        }
        if buf.len() < len {
            return Err(CoreError::too_short(len, buf.len()));
        }
        Ok(buf.split_to(len))
    }
}

// ============================================
// AuthRequestFrame Codec
// ============================================

impl Codec<AuthRequestFrame> for HandshakeCodec {
    fn encode(&self, msg: &AuthRequestFrame, buf: &mut BytesMut) -> Result<()> {
        let id = msg.responder_id.as_bytes();
        let id_len = u16::try_from(id.len())
            .map_err(|_| CoreError::too_large(usize::from(u16::MAX), id.len()))?;

        buf.reserve(AUTH_REQUEST_MIN_SIZE + id.len());
        buf.put_u8(MessageType::AuthRequest.as_byte());
        buf.put_u8(msg.version);
        buf.put_slice(&msg.initiator_ephemeral);
        buf.put_u16_le(id_len);
        buf.put_slice(id);
        Ok(())
    }

    fn decode(&self, buf: &mut Bytes) -> Result<AuthRequestFrame> {
        Self::read_header(buf, MessageType::AuthRequest, AUTH_REQUEST_MIN_SIZE)?;
        let initiator_ephemeral = Self::read_key(buf);

        let id_len = usize::from(buf.get_u16_le());
        let raw = Self::read_prefixed(buf, id_len, usize::from(u16::MAX))?;
        let id = std::str::from_utf8(&raw)
            .map_err(|_| CoreError::malformed("responder id is not UTF-8"))?;
        let responder_id = ResponderId::new(id)?;

        Ok(AuthRequestFrame {
            version: HANDSHAKE_VERSION,
            initiator_ephemeral,
            responder_id,
        })
    }
}

// ============================================
// AuthResponseFrame Codec
// ============================================

impl Codec<AuthResponseFrame> for HandshakeCodec {
    fn encode(&self, msg: &AuthResponseFrame, buf: &mut BytesMut) -> Result<()> {
        if msg.evidence.len() > MAX_EVIDENCE_SIZE {
            return Err(CoreError::too_large(MAX_EVIDENCE_SIZE, msg.evidence.len()));
        }
        let evidence_len = u32::try_from(msg.evidence.len())
            .map_err(|_| CoreError::too_large(MAX_EVIDENCE_SIZE, msg.evidence.len()))?;
        let confirmation_len = u16::try_from(msg.confirmation.len())
            .map_err(|_| CoreError::too_large(usize::from(u16::MAX), msg.confirmation.len()))?;

        buf.reserve(AUTH_RESPONSE_MIN_SIZE + msg.evidence.len() + msg.confirmation.len());
        buf.put_u8(MessageType::AuthResponse.as_byte());
        buf.put_u8(msg.version);
        buf.put_slice(&msg.responder_static);
        buf.put_slice(&msg.responder_ephemeral);
        buf.put_u32_le(evidence_len);
        buf.put_slice(&msg.evidence);
        buf.put_u16_le(confirmation_len);
        buf.put_slice(&msg.confirmation);
        Ok(())
    }

    fn decode(&self, buf: &mut Bytes) -> Result<AuthResponseFrame> {
        Self::read_header(buf, MessageType::AuthResponse, AUTH_RESPONSE_MIN_SIZE)?;
        let responder_static = Self::read_key(buf);
        let responder_ephemeral = Self::read_key(buf);

        let evidence_len = usize::try_from(buf.get_u32_le())
            .map_err(|_| CoreError::malformed("evidence length overflows usize"))?;
        let evidence = Self::read_prefixed(buf, evidence_len, MAX_EVIDENCE_SIZE)?;

        if buf.len() < 2 {
            return Err(CoreError::too_short(2, buf.len()));
        }
        let confirmation_len = usize::from(buf.get_u16_le());
        let confirmation = Self::read_prefixed(buf, confirmation_len, usize::from(u16::MAX))?;

        Ok(AuthResponseFrame {
            version: HANDSHAKE_VERSION,
            responder_static,
            responder_ephemeral,
            evidence: evidence.to_vec(),
            confirmation: confirmation.to_vec(),
        })
    }
}

// ============================================
// Tests
// ============================================
