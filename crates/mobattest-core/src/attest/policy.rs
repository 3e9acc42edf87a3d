// ============================================
// File: crates/mobattest-core/src/attest/policy.rs
// ============================================
//! # Attestation Policy
//!
//! ## Creation Reason
//! Describes which enclaves a client is willing to talk to, either by
//! exact code identity (MRENCLAVE) or by signer identity (MRSIGNER with
//! product and minimum-version constraints).
//!
//! ## Main Functionality
//! - `EnclaveMeasurement`: MRENCLAVE entry with advisory allow-lists
//! - `SignerMeasurement`: MRSIGNER entry with product id / minimum SVN
//! - `AttestationPolicy`: Immutable set of entries; a report is accepted
//!   if any single entry accepts it
//!
//! ## Advisory Rules
//! | Quote status | Requirement on every reported advisory |
//! |--------------|----------------------------------------|
//! | Ok | none |
//! | ConfigurationNeeded | in `config_advisories` |
//! | SwHardeningNeeded | in `hardening_advisories` |
//! | ConfigurationAndSwHardeningNeeded | in both lists |
//! | OutOfDate / Revoked | never accepted |
//!
//! ## Last Modified
//! v0.1.0 - Initial policy definitions

use serde::{Deserialize, Serialize};

use mobattest_common::Measurement;

use super::report::{EnclaveReport, QuoteStatus};

// ============================================
// Advisory Check
// ============================================

fn advisories_allowed(
    status: QuoteStatus,
    advisories: &[String],
    config_allowed: &[String],
    hardening_allowed: &[String],
) -> bool {
    match status {
        QuoteStatus::Ok => true,
        QuoteStatus::ConfigurationNeeded => {
            advisories.iter().all(|id| config_allowed.contains(id))
        }
        QuoteStatus::SwHardeningNeeded => {
            advisories.iter().all(|id| hardening_allowed.contains(id))
        }
        QuoteStatus::ConfigurationAndSwHardeningNeeded => advisories
            .iter()
            .all(|id| config_allowed.contains(id) && hardening_allowed.contains(id)),
        QuoteStatus::OutOfDate | QuoteStatus::Revoked => false,
    }
}

// ============================================
// EnclaveMeasurement
// ============================================

/// Accepts one exact enclave build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnclaveMeasurement {
    /// Expected MRENCLAVE.
    pub mr_enclave: Measurement,
    /// Advisories tolerated when the platform needs configuration.
    #[serde(default)]
    pub config_advisories: Vec<String>,
    /// Advisories tolerated because the enclave is hardened against them.
    #[serde(default)]
    pub hardening_advisories: Vec<String>,
}

impl EnclaveMeasurement {
    /// Creates an entry tolerating no advisories.
    #[must_use]
    pub const fn new(mr_enclave: Measurement) -> Self {
        Self {
            mr_enclave,
            config_advisories: Vec::new(),
            hardening_advisories: Vec::new(),
        }
    }

    /// Adds advisories tolerated as configuration issues.
    #[must_use]
    pub fn with_config_advisories<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config_advisories.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Adds advisories tolerated as software-hardening issues.
    #[must_use]
    pub fn with_hardening_advisories<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hardening_advisories.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Returns `true` if this entry accepts `report`.
    #[must_use]
    pub fn accepts(&self, report: &EnclaveReport) -> bool {
        report.mr_enclave == self.mr_enclave
            && advisories_allowed(
                report.quote_status,
                &report.advisory_ids,
                &self.config_advisories,
                &self.hardening_advisories,
            )
    }
}

// ============================================
// SignerMeasurement
// ============================================

/// Accepts any enclave build from one signer and product, at or above a
/// minimum security version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerMeasurement {
    /// Expected MRSIGNER.
    pub mr_signer: Measurement,
    /// Expected ISV product id.
    pub product_id: u16,
    /// Lowest acceptable ISV security version.
    pub minimum_security_version: u16,
    /// Advisories tolerated when the platform needs configuration.
    #[serde(default)]
    pub config_advisories: Vec<String>,
    /// Advisories tolerated because the enclave is hardened against them.
    #[serde(default)]
    pub hardening_advisories: Vec<String>,
}

impl SignerMeasurement {
    /// Creates an entry tolerating no advisories.
    #[must_use]
    pub const fn new(mr_signer: Measurement, product_id: u16, minimum_security_version: u16) -> Self {
        Self {
            mr_signer,
            product_id,
            minimum_security_version,
            config_advisories: Vec::new(),
            hardening_advisories: Vec::new(),
        }
    }

    /// Adds advisories tolerated as configuration issues.
    #[must_use]
    pub fn with_config_advisories<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config_advisories.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Adds advisories tolerated as software-hardening issues.
    #[must_use]
    pub fn with_hardening_advisories<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hardening_advisories.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Returns `true` if this entry accepts `report`.
    #[must_use]
    pub fn accepts(&self, report: &EnclaveReport) -> bool {
        report.mr_signer == self.mr_signer
            && report.product_id == self.product_id
            && report.security_version >= self.minimum_security_version
            && advisories_allowed(
                report.quote_status,
                &report.advisory_ids,
                &self.config_advisories,
                &self.hardening_advisories,
            )
    }
}

// ============================================
// AttestationPolicy
// ============================================

/// The set of enclave identities a verifier accepts.
///
/// # Example
/// ```
/// use mobattest_common::Measurement;
/// use mobattest_core::attest::{AttestationPolicy, EnclaveMeasurement};
///
/// let mr_enclave = Measurement::from_hex(&"deadbeef".repeat(8)).unwrap();
/// let policy = AttestationPolicy::new().with_enclave(EnclaveMeasurement::new(mr_enclave));
/// assert_eq!(policy.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationPolicy {
    #[serde(default)]
    enclaves: Vec<EnclaveMeasurement>,
    #[serde(default)]
    signers: Vec<SignerMeasurement>,
}

impl AttestationPolicy {
    /// Creates an empty policy (accepts nothing).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            enclaves: Vec::new(),
            signers: Vec::new(),
        }
    }

    /// Adds an MRENCLAVE entry.
    #[must_use]
    pub fn with_enclave(mut self, entry: EnclaveMeasurement) -> Self {
        self.enclaves.push(entry);
        self
    }

    /// Adds an MRSIGNER entry.
    #[must_use]
    pub fn with_signer(mut self, entry: SignerMeasurement) -> Self {
        self.signers.push(entry);
        self
    }

    /// Returns the MRENCLAVE entries.
    #[must_use]
    pub fn enclaves(&self) -> &[EnclaveMeasurement] {
        &self.enclaves
    }

    /// Returns the MRSIGNER entries.
    #[must_use]
    pub fn signers(&self) -> &[SignerMeasurement] {
        &self.signers
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.enclaves.len() + self.signers.len()
    }

    /// Returns `true` if the policy has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if any entry accepts `report`.
    #[must_use]
    pub fn accepts(&self, report: &EnclaveReport) -> bool {
        self.enclaves.iter().any(|entry| entry.accepts(report))
            || self.signers.iter().any(|entry| entry.accepts(report))
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    const ADVISORY: &str = "INTEL-SA-00334";

    fn mr_enclave() -> Measurement {
        Measurement::new([0xde; 32])
    }

    fn mr_signer() -> Measurement {
        Measurement::new([0x5a; 32])
    }

    fn report_with(status: QuoteStatus, advisories: &[&str]) -> EnclaveReport {
        let mut report = EnclaveReport::new(mr_enclave(), mr_signer());
        report.product_id = 2;
        report.security_version = 5;
        report.quote_status = status;
        report.advisory_ids = advisories.iter().map(|s| (*s).to_string()).collect();
        report
    }

    #[test]
    fn test_exact_enclave_accepted() {
        let entry = EnclaveMeasurement::new(mr_enclave());
        assert!(entry.accepts(&report_with(QuoteStatus::Ok, &[])));
    }

    #[test]
    fn test_other_enclave_rejected() {
        let entry = EnclaveMeasurement::new(Measurement::new([0x11; 32]));
        assert!(!entry.accepts(&report_with(QuoteStatus::Ok, &[])));
    }

    #[test]
    fn test_hardening_advisory_requires_allow_list() {
        let report = report_with(QuoteStatus::SwHardeningNeeded, &[ADVISORY]);

        assert!(!EnclaveMeasurement::new(mr_enclave()).accepts(&report));
        assert!(!EnclaveMeasurement::new(mr_enclave())
            .with_config_advisories([ADVISORY])
            .accepts(&report));
        assert!(EnclaveMeasurement::new(mr_enclave())
            .with_hardening_advisories([ADVISORY])
            .accepts(&report));
    }

    #[test]
    fn test_combined_status_requires_both_lists() {
        let report = report_with(QuoteStatus::ConfigurationAndSwHardeningNeeded, &[ADVISORY]);

        let config_only = EnclaveMeasurement::new(mr_enclave()).with_config_advisories([ADVISORY]);
        assert!(!config_only.accepts(&report));

        let both = config_only.with_hardening_advisories([ADVISORY]);
        assert!(both.accepts(&report));
    }

    #[test]
    fn test_revoked_never_accepted() {
        let entry = EnclaveMeasurement::new(mr_enclave())
            .with_config_advisories([ADVISORY])
            .with_hardening_advisories([ADVISORY]);
        assert!(!entry.accepts(&report_with(QuoteStatus::Revoked, &[])));
        assert!(!entry.accepts(&report_with(QuoteStatus::OutOfDate, &[ADVISORY])));
    }

    #[test]
    fn test_signer_constraints() {
        let report = report_with(QuoteStatus::Ok, &[]);

        assert!(SignerMeasurement::new(mr_signer(), 2, 5).accepts(&report));
        assert!(SignerMeasurement::new(mr_signer(), 2, 4).accepts(&report));
        assert!(!SignerMeasurement::new(mr_signer(), 2, 6).accepts(&report));
        assert!(!SignerMeasurement::new(mr_signer(), 3, 5).accepts(&report));
        assert!(!SignerMeasurement::new(mr_enclave(), 2, 5).accepts(&report));
    }

    #[test]
    fn test_policy_any_entry_accepts() {
        let report = report_with(QuoteStatus::Ok, &[]);

        let policy = AttestationPolicy::new()
            .with_enclave(EnclaveMeasurement::new(Measurement::new([0x11; 32])))
            .with_signer(SignerMeasurement::new(mr_signer(), 2, 1));
        assert!(policy.accepts(&report));
        assert_eq!(policy.len(), 2);

        assert!(!AttestationPolicy::new().accepts(&report));
        assert!(AttestationPolicy::new().is_empty());
    }

    #[test]
    fn test_policy_from_toml() {
        let toml = format!(
            r#"
            [[enclaves]]
            mr_enclave = "{}"
            hardening_advisories = ["{ADVISORY}"]

            [[signers]]
            mr_signer = "{}"
            product_id = 2
            minimum_security_version = 5
            "#,
            mr_enclave().to_hex(),
            mr_signer().to_hex(),
        );
        let policy: AttestationPolicy = toml::from_str(&toml).unwrap();
        assert_eq!(policy.enclaves()[0].hardening_advisories, vec![ADVISORY]);
        assert_eq!(policy.signers()[0].product_id, 2);
    }
}
