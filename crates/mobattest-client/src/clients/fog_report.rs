// ============================================
// File: crates/mobattest-client/src/clients/fog_report.rs
// ============================================
//! # Fog Reports
//!
//! ## Creation Reason
//! Paying a fog user requires the public key of that user's fog ingest
//! enclave. The report server publishes it, together with evidence that
//! the key was generated inside an attested ingest enclave.
//!
//! ## Main Functionality
//! - `FogReportClient`: report fetches through the per-endpoint cache
//! - `FogReportValidator`: checks a report and extracts its public key
//!
//! ## Validation Order
//! 1. The report id is present (`ReportNotFound`)
//! 2. The key is valid long enough (`ReportExpired`)
//! 3. The evidence passes the ingest policy (`ReportInvalid`)
//! 4. The evidence binds the published key (`ReportInvalid(IdentityBinding)`)
//!
//! ## Last Modified
//! v0.1.0 - Initial fog report client

use std::slice;
use std::sync::Arc;

use tracing::debug;

use mobattest_core::attest::AttestationVerifier;
use mobattest_core::VerificationError;

use crate::api::report::ReportResponse;
use crate::error::{ClientError, Result};
use crate::services::report_cache::{ReportRequirement, ReportServer};

// ============================================
// FogPublicKey
// ============================================

/// A fog ingest public key taken from a validated report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FogPublicKey {
    /// Report the key came from.
    pub report_id: String,
    /// Ingest public key.
    pub pubkey: Vec<u8>,
    /// Last block index the key may be used for.
    pub pubkey_expiry: u64,
}

// ============================================
// FogReportValidator
// ============================================

/// Validates fog reports against the ingest enclave policy.
#[derive(Debug, Clone)]
pub struct FogReportValidator {
    verifier: Arc<AttestationVerifier>,
}

impl FogReportValidator {
    /// Creates a validator applying `verifier` to report evidence.
    #[must_use]
    pub const fn new(verifier: Arc<AttestationVerifier>) -> Self {
        Self { verifier }
    }

    /// Validates the report `requirement` names and returns its key.
    ///
    /// # Errors
    /// See the module documentation for the order of checks.
    pub fn validate(
        &self,
        response: &ReportResponse,
        requirement: &ReportRequirement,
    ) -> Result<FogPublicKey> {
        let report = response
            .find(&requirement.report_id)
            .ok_or_else(|| ClientError::ReportNotFound {
                report_id: requirement.report_id.clone(),
            })?;

        if report.pubkey_expiry < requirement.minimum_pubkey_expiry {
            return Err(ClientError::ReportExpired {
                report_id: requirement.report_id.clone(),
                expiry: report.pubkey_expiry,
                minimum: requirement.minimum_pubkey_expiry,
            });
        }

        let enclave = self
            .verifier
            .verify_bytes(&report.attestation_evidence)
            .map_err(ClientError::ReportInvalid)?;
        if !enclave.binds_key(&report.pubkey) {
            return Err(ClientError::ReportInvalid(VerificationError::IdentityBinding));
        }

        debug!(
            report_id = %report.fog_report_id,
            expiry = report.pubkey_expiry,
            mr_enclave = %enclave.mr_enclave,
            "Fog report validated"
        );
        Ok(FogPublicKey {
            report_id: report.fog_report_id.clone(),
            pubkey: report.pubkey.clone(),
            pubkey_expiry: report.pubkey_expiry,
        })
    }
}

// ============================================
// FogReportClient
// ============================================

/// Report server client backed by the shared report cache.
#[derive(Debug)]
pub struct FogReportClient {
    server: Arc<ReportServer>,
}

impl FogReportClient {
    /// Wraps the cached server for one endpoint.
    #[must_use]
    pub const fn new(server: Arc<ReportServer>) -> Self {
        Self { server }
    }

    /// Returns the cached server.
    #[must_use]
    pub const fn server(&self) -> &Arc<ReportServer> {
        &self.server
    }

    /// Returns reports satisfying `requirements` (cached when possible).
    ///
    /// # Errors
    /// See [`ReportServer::reports`].
    pub async fn get_reports(
        &self,
        requirements: Option<&[ReportRequirement]>,
    ) -> Result<Arc<ReportResponse>> {
        self.server.reports(requirements).await
    }

    /// Fetches and validates the report `requirement` names.
    ///
    /// # Errors
    /// Fetch failures, then [`FogReportValidator::validate`] failures.
    pub async fn fog_public_key(
        &self,
        validator: &FogReportValidator,
        requirement: &ReportRequirement,
    ) -> Result<FogPublicKey> {
        let response = self
            .get_reports(Some(slice::from_ref(requirement)))
            .await?;
        validator.validate(&response, requirement)
    }
}
