// ============================================
// File: crates/mobattest-core/src/crypto/keys.rs
// ============================================
//! # Cryptographic Key Types
//!
//! ## Creation Reason
//! Defines the key types of the attested channel with proper security
//! properties (Zeroize on drop, redacted Debug output).
//!
//! ## Main Functionality
//! - `AuthoritySigningKey`: Ed25519 key of the attestation authority that
//!   signs enclave reports
//! - `AuthorityPublicKey`: Verifying half, configured into verifiers
//! - `ExchangeKeyPair`: X25519 key pair used for both the initiator's
//!   ephemeral key and the responder's static/ephemeral keys
//! - `SessionKey`: Derived symmetric key
//!
//! ## ⚠️ Important Note for Next Developer
//! - ALL secret key types MUST implement Zeroize
//! - Private keys should NEVER be logged
//! - `ExchangeKeyPair` takes its randomness from the caller so handshakes
//!   are reproducible under a seeded RNG
//!
//! ## Last Modified
//! v0.1.0 - Initial key type definitions

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use mobattest_common::CommonError;

use super::{CHACHA20_KEY_SIZE, ED25519_PUBLIC_KEY_SIZE, ED25519_SIGNATURE_SIZE, X25519_PUBLIC_KEY_SIZE};
use crate::error::{AkeError, VerificationError};

// ============================================
// AuthoritySigningKey (Ed25519)
// ============================================

/// Ed25519 key of the attestation authority.
///
/// The authority vouches for enclave reports by signing their encoding.
/// In production this key lives with the attestation service; clients
/// only ever hold the [`AuthorityPublicKey`].
///
/// # Example
/// ```
/// use mobattest_core::crypto::AuthoritySigningKey;
///
/// let authority = AuthoritySigningKey::from_bytes(&[7u8; 32]);
/// let signature = authority.sign(b"report");
/// assert!(authority.public_key().verify(b"report", &signature).is_ok());
/// ```
pub struct AuthoritySigningKey {
    signing_key: SigningKey,
}

impl AuthoritySigningKey {
    /// Generates a new authority key from the supplied RNG.
    pub fn generate<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        let mut seed = Zeroizing::new([0u8; 32]);
        rng.fill_bytes(&mut seed[..]);
        Self::from_bytes(&seed)
    }

    /// Creates an authority key from a 32-byte seed.
    #[must_use]
    pub fn from_bytes(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Returns the verifying half.
    #[must_use]
    pub fn public_key(&self) -> AuthorityPublicKey {
        AuthorityPublicKey(self.signing_key.verifying_key())
    }

    /// Signs a message.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> [u8; ED25519_SIGNATURE_SIZE] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for AuthoritySigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print private key material
        f.debug_struct("AuthoritySigningKey")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

// ============================================
// AuthorityPublicKey
// ============================================

/// Public key of the attestation authority.
///
/// Serializes as base64 in human-readable formats (the config file form).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AuthorityPublicKey(VerifyingKey);

impl AuthorityPublicKey {
    /// Creates a public key from raw bytes.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the bytes are not a valid Ed25519 point.
    pub fn from_bytes(bytes: &[u8; ED25519_PUBLIC_KEY_SIZE]) -> Result<Self, CommonError> {
        VerifyingKey::from_bytes(bytes)
            .map(Self)
            .map_err(|_| CommonError::invalid_input("authority_public_key", "not a valid Ed25519 key"))
    }

    /// Parses a base64-encoded public key.
    ///
    /// # Errors
    /// Returns a decoding or length error for malformed input.
    pub fn from_base64(encoded: &str) -> Result<Self, CommonError> {
        let bytes = BASE64.decode(encoded.trim())?;
        let arr: [u8; ED25519_PUBLIC_KEY_SIZE] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CommonError::invalid_length(ED25519_PUBLIC_KEY_SIZE, bytes.len()))?;
        Self::from_bytes(&arr)
    }

    /// Returns the raw public key bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; ED25519_PUBLIC_KEY_SIZE] {
        self.0.to_bytes()
    }

    /// Verifies an authority signature.
    ///
    /// # Errors
    /// Returns `BadSignature` if verification fails.
    pub fn verify(
        &self,
        message: &[u8],
        signature: &[u8; ED25519_SIGNATURE_SIZE],
    ) -> Result<(), VerificationError> {
        let sig = Signature::from_bytes(signature);
        self.0
            .verify(message, &sig)
            .map_err(|_| VerificationError::BadSignature)
    }
}

impl fmt::Debug for AuthorityPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0.as_bytes();
        write!(
            f,
            "AuthorityPublicKey({:02x}{:02x}{:02x}{:02x}...)",
            bytes[0], bytes[1], bytes[2], bytes[3]
        )
    }
}

impl fmt::Display for AuthorityPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&BASE64.encode(self.0.as_bytes()))
    }
}

impl Serialize for AuthorityPublicKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&BASE64.encode(self.0.as_bytes()))
        } else {
            serializer.serialize_bytes(self.0.as_bytes())
        }
    }
}

impl<'de> Deserialize<'de> for AuthorityPublicKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_base64(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            let arr: [u8; ED25519_PUBLIC_KEY_SIZE] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| serde::de::Error::invalid_length(bytes.len(), &"32 bytes"))?;
            Self::from_bytes(&arr).map_err(serde::de::Error::custom)
        }
    }
}

// ============================================
// ExchangeKeyPair (X25519)
// ============================================

/// X25519 key pair for Diffie-Hellman.
///
/// The initiator needs two exchanges with the same ephemeral secret
/// (against the responder's ephemeral and static keys), so the secret is
/// reusable for the lifetime of the value and zeroed on drop.
#[derive(Clone)]
pub struct ExchangeKeyPair {
    secret: StaticSecret,
    public: X25519PublicKey,
}

impl ExchangeKeyPair {
    /// Generates a key pair from the supplied RNG.
    pub fn generate<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = Zeroizing::new([0u8; 32]);
        rng.fill_bytes(&mut bytes[..]);
        let secret = StaticSecret::from(*bytes);
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Returns the public key bytes.
    #[must_use]
    pub fn public_key_bytes(&self) -> [u8; X25519_PUBLIC_KEY_SIZE] {
        self.public.to_bytes()
    }

    /// Computes the shared secret with a peer public key.
    ///
    /// # Errors
    /// Returns `KeyExchange` if the result is non-contributory (the peer
    /// supplied a low-order point).
    pub fn diffie_hellman(
        &self,
        peer_public: &[u8; X25519_PUBLIC_KEY_SIZE],
    ) -> Result<Zeroizing<[u8; 32]>, AkeError> {
        let shared = self.secret.diffie_hellman(&X25519PublicKey::from(*peer_public));
        if !shared.was_contributory() {
            return Err(AkeError::KeyExchange {
                reason: "non-contributory shared secret",
            });
        }
        Ok(Zeroizing::new(*shared.as_bytes()))
    }
}

impl fmt::Debug for ExchangeKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.public.as_bytes();
        f.debug_struct("ExchangeKeyPair")
            .field(
                "public",
                &format_args!("{:02x}{:02x}{:02x}{:02x}...", bytes[0], bytes[1], bytes[2], bytes[3]),
            )
            .finish_non_exhaustive()
    }
}

// ============================================
// SessionKey
// ============================================

/// Symmetric session key for the AEAD cipher.
///
/// # Derivation
/// ```text
/// session_key = HKDF-SHA256(
///     ikm:  DH(e_i, e_r) || DH(e_i, s_r),
///     salt: "mobattest-ake-v1",
///     info: "mobattest-session-key" || transcript_hash
/// )
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey([u8; CHACHA20_KEY_SIZE]);

impl SessionKey {
    /// Creates a session key from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; CHACHA20_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns the raw key bytes.
    ///
    /// # Security Warning
    /// Only pass these to the cipher; never log or persist them.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; CHACHA20_KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey([REDACTED])")
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_authority_sign_verify() {
        let authority = AuthoritySigningKey::from_bytes(&[7u8; 32]);
        let public = authority.public_key();
        let signature = authority.sign(b"enclave report");

        assert!(public.verify(b"enclave report", &signature).is_ok());
        assert_eq!(
            public.verify(b"other report", &signature),
            Err(VerificationError::BadSignature)
        );
    }

    #[test]
    fn test_authority_public_key_base64_roundtrip() {
        let public = AuthoritySigningKey::from_bytes(&[9u8; 32]).public_key();
        let encoded = public.to_string();
        assert_eq!(AuthorityPublicKey::from_base64(&encoded).unwrap(), public);
        assert!(AuthorityPublicKey::from_base64("AAAA").is_err());
    }

    #[test]
    fn test_exchange_agrees() {
        let mut rng = StdRng::from_seed([3u8; 32]);
        let alice = ExchangeKeyPair::generate(&mut rng);
        let bob = ExchangeKeyPair::generate(&mut rng);

        let ab = alice.diffie_hellman(&bob.public_key_bytes()).unwrap();
        let ba = bob.diffie_hellman(&alice.public_key_bytes()).unwrap();
        assert_eq!(*ab, *ba);
    }

    #[test]
    fn test_exchange_rejects_low_order_point() {
        let mut rng = StdRng::from_seed([3u8; 32]);
        let alice = ExchangeKeyPair::generate(&mut rng);
        assert!(matches!(
            alice.diffie_hellman(&[0u8; 32]),
            Err(AkeError::KeyExchange { .. })
        ));
    }

    #[test]
    fn test_generation_is_deterministic_under_seed() {
        let a = ExchangeKeyPair::generate(&mut StdRng::from_seed([1u8; 32]));
        let b = ExchangeKeyPair::generate(&mut StdRng::from_seed([1u8; 32]));
        assert_eq!(a.public_key_bytes(), b.public_key_bytes());
    }

    #[test]
    fn test_session_key_debug_redacted() {
        let key = SessionKey::from_bytes([0x42; 32]);
        assert!(!format!("{key:?}").contains("42"));
    }
}
