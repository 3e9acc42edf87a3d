// ============================================
// File: crates/mobattest-core/src/crypto/kdf.rs
// ============================================
//! # Key Derivation Functions
//!
//! ## Main Functionality
//! - `derive_session`: Derives the session key and the channel-binding
//!   value from the two X25519 outputs and the handshake transcript
//!
//! Both outputs come from one HKDF-SHA256 extraction, expanded under
//! distinct info labels so the channel id reveals nothing about the key.
//!
//! ## Last Modified
//! v0.1.0 - Initial derivation

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use mobattest_common::types::CHANNEL_ID_SIZE;
use mobattest_common::ChannelId;

use super::{CHACHA20_KEY_SIZE, HKDF_BINDING_INFO, HKDF_KEY_INFO, HKDF_SALT};
use crate::crypto::SessionKey;
use crate::error::AkeError;

/// Size of a transcript hash in bytes.
pub const TRANSCRIPT_HASH_SIZE: usize = 32;

/// Derives `(session_key, channel_id)` for an attested session.
///
/// # Arguments
/// * `dh_ee` - DH(initiator ephemeral, responder ephemeral)
/// * `dh_es` - DH(initiator ephemeral, responder static)
/// * `transcript` - SHA-256 of the handshake transcript
///
/// # Errors
/// Returns `KeyExchange` if HKDF expansion fails (cannot happen for
/// these output sizes).
pub fn derive_session(
    dh_ee: &[u8; 32],
    dh_es: &[u8; 32],
    transcript: &[u8; TRANSCRIPT_HASH_SIZE],
) -> Result<(SessionKey, ChannelId), AkeError> {
    let mut ikm = Zeroizing::new([0u8; 64]);
    ikm[..32].copy_from_slice(dh_ee);
    ikm[32..].copy_from_slice(dh_es);

    let hk = Hkdf::<Sha256>::new(Some(HKDF_SALT), ikm.as_slice());

    let mut key_bytes = Zeroizing::new([0u8; CHACHA20_KEY_SIZE]);
    hk.expand_multi_info(&[HKDF_KEY_INFO, transcript.as_slice()], key_bytes.as_mut_slice())
        .map_err(|_| AkeError::KeyExchange {
            reason: "HKDF expansion failed",
        })?;

    let mut binding = [0u8; CHANNEL_ID_SIZE];
    hk.expand_multi_info(&[HKDF_BINDING_INFO, transcript.as_slice()], &mut binding)
        .map_err(|_| AkeError::KeyExchange {
            reason: "HKDF expansion failed",
        })?;

    Ok((SessionKey::from_bytes(*key_bytes), ChannelId::new(binding)))
}

// ============================================
// Tests
// ============================================
