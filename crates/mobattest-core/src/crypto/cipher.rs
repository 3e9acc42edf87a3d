// ============================================
// File: crates/mobattest-core/src/crypto/cipher.rs
// ============================================
//! # Session AEAD Cipher
//!
//! ## Creation Reason
//! Provides authenticated encryption for every payload exchanged on an
//! attested session, using ChaCha20-Poly1305 with caller-supplied AAD.
//!
//! ## Main Functionality
//! - `Cipher`: Immutable per-session cipher, shared behind `Arc`
//! - `CipherRole`: Which side of the handshake sealed a frame
//! - Nonce construction from an atomic counter and the role
//!
//! ## Frame Format
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │ Nonce (12 bytes)               │ ← carried in clear   │
//! │ ├─ Counter (8 bytes LE)        │                      │
//! │ └─ Role (4 bytes)              │ 0 initiator, 1 resp. │
//! ├────────────────────────────────────────────────────┤
//! │ Encrypted Payload (variable)   │ ← ChaCha20 ciphertext │
//! │ └─ Poly1305 Tag (16 bytes)     │ ← over payload + AAD  │
//! └────────────────────────────────────────────────────┘
//! ```
//!
//! Because the nonce travels in the frame, `decrypt` does not depend on
//! this instance's counter: a cipher can open frames sealed by either
//! role, including its own. Traffic from the other side goes through
//! `decrypt_from_peer`, which also requires the peer's role tag and a
//! counter the receive window has not seen.
//!
//! ## ⚠️ Important Note for Next Developer
//! - Never reuse a (key, nonce) pair. The role prefix keeps the two
//!   directions apart; the counter keeps frames of one side apart
//! - Counter exhaustion is reported as `Cipher`, the owner must re-attest
//! - Decryption failures are never retried here
//! - A reflected or replayed frame fails as `Aead`, like a forged one
//!
//! ## Last Modified
//! v0.1.0 - Initial cipher implementation

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Nonce,
};

use mobattest_common::ChannelId;

use super::{CHACHA20_NONCE_SIZE, POLY1305_TAG_SIZE};
use crate::crypto::keys::SessionKey;
use crate::crypto::replay::ReplayWindow;
use crate::error::AeadError;

// ============================================
// Constants
// ============================================

/// Bytes added to every plaintext (nonce + tag).
pub const FRAME_OVERHEAD: usize = CHACHA20_NONCE_SIZE + POLY1305_TAG_SIZE;

// ============================================
// CipherRole
// ============================================

/// Side of the handshake a cipher belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherRole {
    /// The client that started the handshake.
    Initiator,
    /// The enclave that answered it.
    Responder,
}

impl CipherRole {
    /// Nonce suffix identifying frames sealed by this role.
    #[must_use]
    pub const fn nonce_tag(self) -> [u8; 4] {
        match self {
            Self::Initiator => [0, 0, 0, 0],
            Self::Responder => [1, 0, 0, 0],
        }
    }

    /// The other side of the handshake.
    #[must_use]
    pub const fn peer(self) -> Self {
        match self {
            Self::Initiator => Self::Responder,
            Self::Responder => Self::Initiator,
        }
    }
}

// ============================================
// Cipher
// ============================================

/// Per-session AEAD cipher.
///
/// Created only by a successful handshake. Key and channel binding are
/// fixed for the lifetime of the value. The interior state is the atomic
/// send counter and the receive window of peer counters, so the cipher
/// is shared across tasks behind an `Arc`.
///
/// # Example
/// ```
/// use mobattest_common::ChannelId;
/// use mobattest_core::crypto::{Cipher, CipherRole, SessionKey};
///
/// let cipher = Cipher::new(
///     SessionKey::from_bytes([0x42; 32]),
///     ChannelId::new([0x01; 32]),
///     CipherRole::Initiator,
/// );
/// let frame = cipher.encrypt(b"", b"ping").unwrap();
/// assert_eq!(cipher.decrypt(b"", &frame).unwrap(), b"ping");
/// ```
pub struct Cipher {
    key: SessionKey,
    channel_id: ChannelId,
    role: CipherRole,
    counter: AtomicU64,
    received: Mutex<ReplayWindow>,
}

impl Cipher {
    /// Creates a cipher from derived session material.
    #[must_use]
    pub fn new(key: SessionKey, channel_id: ChannelId, role: CipherRole) -> Self {
        Self {
            key,
            channel_id,
            role,
            counter: AtomicU64::new(0),
            received: Mutex::new(ReplayWindow::new()),
        }
    }

    /// Returns the channel-binding value of the session.
    #[must_use]
    pub const fn channel_id(&self) -> &ChannelId {
        &self.channel_id
    }

    /// Returns the role this cipher seals frames as.
    #[must_use]
    pub const fn role(&self) -> CipherRole {
        self.role
    }

    /// Returns how many frames this cipher has sealed.
    #[must_use]
    pub fn frames_sealed(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }

    /// Encrypts `plaintext`, authenticating `aad`.
    ///
    /// # Errors
    /// - `Cipher`: the nonce counter is exhausted
    /// - `Aead`: the primitive failed (only for absurd lengths)
    pub fn encrypt(&self, aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, AeadError> {
        let counter = self.counter.fetch_add(1, Ordering::Relaxed);
        if counter == u64::MAX {
            return Err(AeadError::Cipher {
                reason: "nonce counter exhausted",
            });
        }
        let nonce = Self::make_nonce(counter, self.role);

        let sealed = self
            .aead()?
            .encrypt(&nonce, Payload { msg: plaintext, aad })
            .map_err(|_| AeadError::Aead)?;

        let mut frame = Vec::with_capacity(CHACHA20_NONCE_SIZE + sealed.len());
        frame.extend_from_slice(nonce.as_slice());
        frame.extend_from_slice(&sealed);
        Ok(frame)
    }

    /// Decrypts a frame produced by `encrypt`, authenticating `aad`.
    ///
    /// # Errors
    /// - `Cipher`: the frame is shorter than nonce + tag
    /// - `Aead`: wrong key, wrong AAD, or a modified frame
    pub fn decrypt(&self, aad: &[u8], frame: &[u8]) -> Result<Vec<u8>, AeadError> {
        if frame.len() < FRAME_OVERHEAD {
            return Err(AeadError::Cipher {
                reason: "frame shorter than nonce and tag",
            });
        }
        let (nonce, sealed) = frame.split_at(CHACHA20_NONCE_SIZE);

        self.aead()?
            .decrypt(Nonce::from_slice(nonce), Payload { msg: sealed, aad })
            .map_err(|_| AeadError::Aead)
    }

    /// Decrypts a frame sealed by the other side of the session.
    ///
    /// The frame must carry the peer's role tag and a counter not opened
    /// before, so neither a reflected frame of our own nor a replayed
    /// peer frame is accepted.
    ///
    /// # Errors
    /// - `Cipher`: the frame is shorter than nonce + tag
    /// - `Aead`: authentication failed, or the frame is reflected or replayed
    pub fn decrypt_from_peer(&self, aad: &[u8], frame: &[u8]) -> Result<Vec<u8>, AeadError> {
        let plaintext = self.decrypt(aad, frame)?;

        let (counter, tag) = Self::split_nonce(frame);
        if tag != self.role.peer().nonce_tag() {
            debug!(channel = %self.channel_id, "Rejected frame not sealed by peer");
            return Err(AeadError::Aead);
        }
        let check = self.received.lock().check_and_record(counter);
        if !check.is_accepted() {
            debug!(channel = %self.channel_id, counter, ?check, "Rejected peer frame");
            return Err(AeadError::Aead);
        }
        Ok(plaintext)
    }

    /// Splits the nonce of an authenticated frame into counter and role tag.
    fn split_nonce(frame: &[u8]) -> (u64, [u8; 4]) {
        let mut counter = [0u8; 8];
        counter.copy_from_slice(&frame[..8]);
        let mut tag = [0u8; 4];
        tag.copy_from_slice(&frame[8..CHACHA20_NONCE_SIZE]);
        (u64::from_le_bytes(counter), tag)
    }

    fn aead(&self) -> Result<ChaCha20Poly1305, AeadError> {
        ChaCha20Poly1305::new_from_slice(self.key.as_bytes()).map_err(|_| AeadError::Cipher {
            reason: "invalid key length",
        })
    }

    /// Constructs a nonce.
    ///
    /// # Format
    /// ```text
    /// nonce[0..8]  = counter (little-endian)
    /// nonce[8..12] = role tag
    /// ```
    fn make_nonce(counter: u64, role: CipherRole) -> Nonce {
        let mut nonce = [0u8; CHACHA20_NONCE_SIZE];
        nonce[..8].copy_from_slice(&counter.to_le_bytes());
        nonce[8..].copy_from_slice(&role.nonce_tag());
        Nonce::from(nonce)
    }
}

impl fmt::Debug for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cipher")
            .field("channel_id", &self.channel_id)
            .field("role", &self.role)
            .field("frames_sealed", &self.frames_sealed())
            .finish_non_exhaustive()
    }
}

// ============================================
// Tests
// ============================================
