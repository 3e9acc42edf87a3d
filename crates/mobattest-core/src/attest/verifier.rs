// ============================================
// File: crates/mobattest-core/src/attest/verifier.rs
// ============================================
//! # Attestation Verifier
//!
//! ## Creation Reason
//! Turns signed evidence into a trusted `EnclaveReport`, or rejects it
//! with a typed reason. Consumed by the AKE state machine during
//! `auth_end` and by Fog report validation.
//!
//! ## Verification Order
//! 1. Authority signature over the exact report bytes
//! 2. Report decoding
//! 3. Quote status (out-of-date / revoked never pass)
//! 4. Policy match (any entry, including advisory allow-lists)
//!
//! ## ⚠️ Important Note for Next Developer
//! - The verifier is immutable after construction and cheap to clone;
//!   share it freely across connections
//! - Binding of `report_data` to a key is the caller's check, since only
//!   the caller knows which key the peer presented
//!
//! ## Last Modified
//! v0.1.0 - Initial verifier

use std::sync::Arc;

use tracing::{debug, warn};

use super::policy::AttestationPolicy;
use super::report::{EnclaveReport, SignedEvidence};
use crate::crypto::AuthorityPublicKey;
use crate::error::VerificationError;

/// Verifies enclave evidence against an authority key and a policy.
#[derive(Debug, Clone)]
pub struct AttestationVerifier {
    authority: AuthorityPublicKey,
    policy: Arc<AttestationPolicy>,
}

impl AttestationVerifier {
    /// Creates a verifier.
    #[must_use]
    pub fn new(authority: AuthorityPublicKey, policy: AttestationPolicy) -> Self {
        Self {
            authority,
            policy: Arc::new(policy),
        }
    }

    /// Returns the policy.
    #[must_use]
    pub fn policy(&self) -> &AttestationPolicy {
        &self.policy
    }

    /// Returns the authority key evidence must be signed with.
    #[must_use]
    pub const fn authority(&self) -> &AuthorityPublicKey {
        &self.authority
    }

    /// Verifies parsed evidence.
    ///
    /// # Errors
    /// Returns the first failed check as a `VerificationError`.
    pub fn verify(&self, evidence: &SignedEvidence) -> Result<EnclaveReport, VerificationError> {
        self.authority
            .verify(evidence.report_bytes(), evidence.signature())?;

        let report = evidence
            .report()
            .map_err(|e| VerificationError::MalformedEvidence {
                reason: e.to_string(),
            })?;

        if report.quote_status.is_never_acceptable() {
            warn!(
                mr_enclave = %report.mr_enclave,
                status = %report.quote_status,
                "Rejecting enclave with unacceptable quote status"
            );
            return Err(VerificationError::QuoteRejected {
                status: report.quote_status,
            });
        }

        if !self.policy.accepts(&report) {
            warn!(
                mr_enclave = %report.mr_enclave,
                mr_signer = %report.mr_signer,
                status = %report.quote_status,
                advisories = ?report.advisory_ids,
                "No policy entry accepts enclave"
            );
            return Err(VerificationError::NoMatchingMeasurement {
                mr_enclave: report.mr_enclave,
                mr_signer: report.mr_signer,
            });
        }

        debug!(mr_enclave = %report.mr_enclave, "Enclave evidence verified");
        Ok(report)
    }

    /// Parses and verifies encoded evidence.
    ///
    /// # Errors
    /// Returns `MalformedEvidence` for unparseable bytes, otherwise as
    /// [`AttestationVerifier::verify`].
    pub fn verify_bytes(&self, evidence: &[u8]) -> Result<EnclaveReport, VerificationError> {
        let evidence =
            SignedEvidence::from_bytes(evidence).map_err(|e| VerificationError::MalformedEvidence {
                reason: e.to_string(),
            })?;
        self.verify(&evidence)
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use mobattest_common::Measurement;

    use super::*;
    use crate::attest::{EnclaveMeasurement, QuoteStatus};
    use crate::crypto::AuthoritySigningKey;

    fn authority() -> AuthoritySigningKey {
        AuthoritySigningKey::from_bytes(&[7u8; 32])
    }

    fn deadbeef() -> Measurement {
        Measurement::from_hex(&"deadbeef".repeat(8)).unwrap()
    }

    fn verifier_for(mr_enclave: Measurement) -> AttestationVerifier {
        AttestationVerifier::new(
            authority().public_key(),
            AttestationPolicy::new().with_enclave(EnclaveMeasurement::new(mr_enclave)),
        )
    }

    fn evidence(report: &EnclaveReport, signer: &AuthoritySigningKey) -> Vec<u8> {
        SignedEvidence::sign(report, signer).unwrap().to_bytes()
    }

    #[test]
    fn test_matching_enclave_verifies() {
        let report = EnclaveReport::new(deadbeef(), Measurement::new([1; 32]));
        let verified = verifier_for(deadbeef())
            .verify_bytes(&evidence(&report, &authority()))
            .unwrap();
        assert_eq!(verified, report);
    }

    #[test]
    fn test_unknown_enclave_rejected() {
        let report = EnclaveReport::new(Measurement::new([2; 32]), Measurement::new([1; 32]));
        let result = verifier_for(deadbeef()).verify_bytes(&evidence(&report, &authority()));
        assert!(matches!(
            result,
            Err(VerificationError::NoMatchingMeasurement { .. })
        ));
    }

    #[test]
    fn test_foreign_authority_rejected() {
        let report = EnclaveReport::new(deadbeef(), Measurement::new([1; 32]));
        let impostor = AuthoritySigningKey::from_bytes(&[8u8; 32]);
        let result = verifier_for(deadbeef()).verify_bytes(&evidence(&report, &impostor));
        assert_eq!(result, Err(VerificationError::BadSignature));
    }

    #[test]
    fn test_tampered_report_rejected() {
        let report = EnclaveReport::new(Measurement::new([2; 32]), Measurement::new([1; 32]));
        let mut bytes = evidence(&report, &authority());
        // Overwrite mr_enclave (after the 2-byte length prefix) with the trusted value
        bytes[2..34].copy_from_slice(deadbeef().as_bytes());
        let result = verifier_for(deadbeef()).verify_bytes(&bytes);
        assert_eq!(result, Err(VerificationError::BadSignature));
    }

    #[test]
    fn test_revoked_rejected_before_policy() {
        let mut report = EnclaveReport::new(deadbeef(), Measurement::new([1; 32]));
        report.quote_status = QuoteStatus::Revoked;
        let result = verifier_for(deadbeef()).verify_bytes(&evidence(&report, &authority()));
        assert_eq!(
            result,
            Err(VerificationError::QuoteRejected {
                status: QuoteStatus::Revoked
            })
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        let result = verifier_for(deadbeef()).verify_bytes(&[0xff; 10]);
        assert!(matches!(
            result,
            Err(VerificationError::MalformedEvidence { .. })
        ));
    }
}
