// ============================================
// File: crates/mobattest-core/src/testing.rs
// ============================================
//! # Test Fixtures
//!
//! Deterministic authority keys, measurements and provisioned
//! responders, shared by this crate's tests and (through the `mock`
//! feature) by downstream crates.

use rand::rngs::StdRng;
use rand::SeedableRng;

use mobattest_common::{Measurement, ResponderId};

use crate::ake::EnclaveResponder;
use crate::attest::{AttestationPolicy, AttestationVerifier, EnclaveMeasurement, EnclaveReport};
use crate::crypto::AuthoritySigningKey;
use crate::error::AkeError;

/// Seed of the fixture attestation authority.
pub const AUTHORITY_SEED: [u8; 32] = [7u8; 32];

/// MRSIGNER used by fixture reports.
pub const FIXTURE_SIGNER: Measurement = Measurement::new([0x5a; 32]);

/// Returns the fixture attestation authority.
#[must_use]
pub fn authority() -> AuthoritySigningKey {
    AuthoritySigningKey::from_bytes(&AUTHORITY_SEED)
}

/// Returns the measurement `deadbeef` repeated over 32 bytes.
#[must_use]
pub fn deadbeef() -> Measurement {
    let mut bytes = [0u8; 32];
    for chunk in bytes.chunks_exact_mut(4) {
        chunk.copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
    }
    Measurement::new(bytes)
}

/// Returns an up-to-date report for `mr_enclave`.
#[must_use]
pub fn enclave_report(mr_enclave: Measurement) -> EnclaveReport {
    EnclaveReport::new(mr_enclave, FIXTURE_SIGNER)
}

/// Returns a verifier trusting the fixture authority and `mr_enclave`.
#[must_use]
pub fn verifier_for(mr_enclave: Measurement) -> AttestationVerifier {
    AttestationVerifier::new(
        authority().public_key(),
        AttestationPolicy::new().with_enclave(EnclaveMeasurement::new(mr_enclave)),
    )
}

/// Provisions a responder running `mr_enclave`, signed by the fixture
/// authority.
///
/// # Errors
/// See [`EnclaveResponder::provision`].
pub fn responder(
    responder_id: &ResponderId,
    mr_enclave: Measurement,
) -> Result<EnclaveResponder, AkeError> {
    provision(responder_id.clone(), enclave_report(mr_enclave))
}

/// Provisions a responder presenting `report`.
///
/// # Errors
/// See [`EnclaveResponder::provision`].
pub fn provision(
    responder_id: ResponderId,
    report: EnclaveReport,
) -> Result<EnclaveResponder, AkeError> {
    let mut rng = StdRng::seed_from_u64(0x00e1_c1a7);
    EnclaveResponder::provision(responder_id, report, &authority(), &mut rng)
}
