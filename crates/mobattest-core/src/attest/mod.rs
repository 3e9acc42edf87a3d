// ============================================
// File: crates/mobattest-core/src/attest/mod.rs
// ============================================
//! # Attestation Module
//!
//! ## Main Functionality
//! - [`report`]: Enclave reports, quote status, signed evidence
//! - [`policy`]: Acceptable MRENCLAVE / MRSIGNER entries
//! - [`verifier`]: Evidence verification against authority and policy
//!
//! ## Last Modified
//! v0.1.0 - Initial attestation module

pub mod policy;
pub mod report;
pub mod verifier;

pub use policy::{AttestationPolicy, EnclaveMeasurement, SignerMeasurement};
pub use report::{EnclaveReport, QuoteStatus, SignedEvidence};
pub use verifier::AttestationVerifier;
