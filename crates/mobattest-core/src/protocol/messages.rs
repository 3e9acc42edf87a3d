// ============================================
// File: crates/mobattest-core/src/protocol/messages.rs
// ============================================
//! # Handshake Message Definitions
//!
//! ## Creation Reason
//! Defines the two frames of the attestation handshake, carried as the
//! `data` field of a protobuf `AuthMessage`.
//!
//! ## Main Functionality
//! - `MessageType`: Frame type identification
//! - `AuthRequestFrame`: Initiator ephemeral key + responder id
//! - `AuthResponseFrame`: Responder keys, evidence, key confirmation
//!
//! ## Wire Format (Little Endian)
//! ```text
//! AuthRequestFrame  = type:u8(0x01) | version:u8 | initiator_ephemeral[32]
//!                   | responder_id_len:u16 | responder_id:utf8
//! AuthResponseFrame = type:u8(0x02) | version:u8 | responder_static[32]
//!                   | responder_ephemeral[32] | evidence_len:u32 | evidence
//!                   | confirmation_len:u16 | confirmation
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Field order is critical - DO NOT reorder without a version bump
//! - The request bytes are hashed into the transcript verbatim
//!
//! ## Last Modified
//! v0.1.0 - Initial message definitions

use mobattest_common::ResponderId;

use crate::crypto::X25519_PUBLIC_KEY_SIZE;

// ============================================
// Constants
// ============================================

/// Current handshake version.
pub const HANDSHAKE_VERSION: u8 = 0x01;

/// Size of the fixed part of an auth request.
pub const AUTH_REQUEST_MIN_SIZE: usize = 1 + 1 + X25519_PUBLIC_KEY_SIZE + 2;

/// Size of the fixed part of an auth response.
pub const AUTH_RESPONSE_MIN_SIZE: usize = 1 + 1 + X25519_PUBLIC_KEY_SIZE * 2 + 4 + 2;

/// Largest evidence blob accepted in an auth response.
pub const MAX_EVIDENCE_SIZE: usize = 64 * 1024;

// ============================================
// MessageType
// ============================================

/// Handshake frame type identifier.
///
/// | Value | Type |
/// |-------|------|
/// | 0x01 | AuthRequest |
/// | 0x02 | AuthResponse |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// Initiator's opening frame.
    AuthRequest = 0x01,
    /// Responder's answer.
    AuthResponse = 0x02,
}

impl MessageType {
    /// Converts a byte to a `MessageType`.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::AuthRequest),
            0x02 => Some(Self::AuthResponse),
            _ => None,
        }
    }

    /// Returns the wire byte.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

// ============================================
// AuthRequestFrame
// ============================================

/// The initiator's opening frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequestFrame {
    /// Handshake version.
    pub version: u8,
    /// Initiator's ephemeral X25519 public key.
    pub initiator_ephemeral: [u8; X25519_PUBLIC_KEY_SIZE],
    /// Enclave service the request is addressed to.
    pub responder_id: ResponderId,
}

// ============================================
// AuthResponseFrame
// ============================================

/// The responder's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponseFrame {
    /// Handshake version.
    pub version: u8,
    /// Responder's static X25519 key (bound by the evidence).
    pub responder_static: [u8; X25519_PUBLIC_KEY_SIZE],
    /// Responder's ephemeral X25519 key.
    pub responder_ephemeral: [u8; X25519_PUBLIC_KEY_SIZE],
    /// Authority-signed evidence, encoded.
    pub evidence: Vec<u8>,
    /// AEAD frame of the empty message under the session key.
    pub confirmation: Vec<u8>,
}
