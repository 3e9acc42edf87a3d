// ============================================
// File: crates/mobattest-core/src/crypto/mod.rs
// ============================================
//! # Cryptography Module
//!
//! ## Creation Reason
//! Centralizes the cryptographic primitives of the attested channel,
//! all taken from audited RustCrypto / dalek implementations.
//!
//! ## Main Functionality
//!
//! ### Submodules
//! - [`keys`]: Authority signing keys, X25519 exchange keys, session keys
//! - [`kdf`]: Session key and channel-binding derivation (HKDF-SHA256)
//! - [`cipher`]: The per-session AEAD cipher (ChaCha20-Poly1305)
//! - [`replay`]: Receive window refusing replayed peer frames
//!
//! ## Cryptographic Design
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Handshake Phase                          │
//! │  Initiator                                   Enclave        │
//! │    │                                              │         │
//! │    │  X25519 ephemeral (e_i) + responder id ────► │         │
//! │    │                                              │         │
//! │    │ ◄──── static (s_r) + ephemeral (e_r)         │         │
//! │    │ ◄──── evidence signed by authority           │         │
//! │    │ ◄──── key confirmation (AEAD of empty msg)   │         │
//! │    │                                              │         │
//! │    │   DH(e_i, e_r) || DH(e_i, s_r)               │         │
//! │    │              │                               │         │
//! │    │              ▼                               │         │
//! │    │   HKDF-SHA256(transcript) ─► key, channel id │         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - NEVER roll your own crypto
//! - ALL secret keys implement Zeroize
//! - Randomness always comes from the caller; no hidden global RNG
//!
//! ## Last Modified
//! v0.1.0 - Initial crypto implementation

pub mod cipher;
pub mod kdf;
pub mod keys;
pub mod replay;

// Re-export primary types at module level
pub use cipher::{Cipher, CipherRole};
pub use keys::{AuthorityPublicKey, AuthoritySigningKey, ExchangeKeyPair, SessionKey};

// ============================================
// Constants
// ============================================

/// Size of Ed25519 public key in bytes.
pub const ED25519_PUBLIC_KEY_SIZE: usize = 32;

/// Size of Ed25519 signature in bytes.
pub const ED25519_SIGNATURE_SIZE: usize = 64;

/// Size of X25519 public key in bytes.
pub const X25519_PUBLIC_KEY_SIZE: usize = 32;

/// Size of ChaCha20-Poly1305 key in bytes.
pub const CHACHA20_KEY_SIZE: usize = 32;

/// Size of ChaCha20-Poly1305 nonce in bytes.
pub const CHACHA20_NONCE_SIZE: usize = 12;

/// Size of Poly1305 authentication tag in bytes.
pub const POLY1305_TAG_SIZE: usize = 16;

/// HKDF salt for session derivation.
pub const HKDF_SALT: &[u8] = b"mobattest-ake-v1";

/// HKDF info prefix for the session key.
pub const HKDF_KEY_INFO: &[u8] = b"mobattest-session-key";

/// HKDF info prefix for the channel-binding value.
pub const HKDF_BINDING_INFO: &[u8] = b"mobattest-channel-binding";
