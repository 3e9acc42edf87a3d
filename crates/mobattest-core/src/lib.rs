// ============================================
// File: crates/mobattest-core/src/lib.rs
// ============================================
//! # mobattest Core - Attested Channel Cryptography
//!
//! ## Creation Reason
//! Provides the handshake, attestation and encryption machinery behind
//! every attested connection. This crate performs no I/O.
//!
//! ## Main Functionality
//!
//! ### Crypto Module ([`crypto`])
//! - `Cipher`: ChaCha20-Poly1305 session cipher with channel binding
//! - Authority (Ed25519) and exchange (X25519) keys
//! - Session derivation (HKDF-SHA256)
//!
//! ### Attestation Module ([`attest`])
//! - `EnclaveReport` / `SignedEvidence`
//! - `AttestationPolicy` (MRENCLAVE and MRSIGNER entries with advisories)
//! - `AttestationVerifier`
//!
//! ### AKE Module ([`ake`])
//! - `AkeStateMachine`: Unattested / Pending / Attested
//! - `EnclaveResponder`: The enclave half, for fakes and tests
//!
//! ### Protocol Module ([`protocol`])
//! - Handshake frame codec and protobuf envelopes
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              mobattest-client                       │
//! │                    │                                │
//! │         ┌──────────┴──────────┐                    │
//! │         ▼                     ▼                    │
//! │   mobattest-core        mobattest-transport        │
//! │   You are here                │                    │
//! │         │                     │                    │
//! │         └──────────┬──────────┘                    │
//! │                    ▼                               │
//! │             mobattest-common                       │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - ALL cryptographic code uses audited RustCrypto / dalek crates
//! - ALL secret keys MUST implement Zeroize
//! - Frame layout changes MUST bump `HANDSHAKE_VERSION`
//!
//! ## Last Modified
//! v0.1.0 - Initial implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod ake;
pub mod attest;
pub mod crypto;
pub mod error;
pub mod protocol;

#[cfg(any(test, feature = "mock"))]
pub mod testing;

// Re-export commonly used items
pub use ake::{AkeStateMachine, EnclaveResponder, SessionState};
pub use attest::{
    AttestationPolicy, AttestationVerifier, EnclaveMeasurement, EnclaveReport, QuoteStatus,
    SignedEvidence, SignerMeasurement,
};
pub use crypto::{AuthorityPublicKey, AuthoritySigningKey, Cipher, CipherRole};
pub use error::{AeadError, AkeError, CoreError, Result, VerificationError};
pub use protocol::{AttestedMessage, AuthMessage};
