// ============================================
// File: crates/mobattest-client/src/api/report.rs
// ============================================
//! Fog report API messages.
//!
//! A report publishes the fog ingest enclave's public key, together with
//! evidence that the key was generated inside an attested ingest enclave
//! (`report_data` binds the key).

/// Report fetch request (no parameters).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReportRequest {}

/// One ingest report.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Report {
    /// Report id the fog url refers to.
    #[prost(string, tag = "1")]
    pub fog_report_id: String,
    /// Encoded `SignedEvidence` from the ingest enclave.
    #[prost(bytes = "vec", tag = "2")]
    pub attestation_evidence: Vec<u8>,
    /// Last block index the key may be used for.
    #[prost(fixed64, tag = "3")]
    pub pubkey_expiry: u64,
    /// Ingest public key.
    #[prost(bytes = "vec", tag = "4")]
    pub pubkey: Vec<u8>,
}

/// Every report published by one report server.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReportResponse {
    /// Reports.
    #[prost(message, repeated, tag = "1")]
    pub reports: Vec<Report>,
}

impl ReportResponse {
    /// Returns the report with `report_id`.
    #[must_use]
    pub fn find(&self, report_id: &str) -> Option<&Report> {
        self.reports.iter().find(|r| r.fog_report_id == report_id)
    }
}
