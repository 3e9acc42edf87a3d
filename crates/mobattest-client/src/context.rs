// ============================================
// File: crates/mobattest-client/src/context.rs
// ============================================
//! # Client Context
//!
//! ## Creation Reason
//! Owns what all clients of one process share: the validated
//! configuration, the attestation authority, the report server registry
//! and the root tracing span. Every connection is built from it, so no
//! component reaches for global state.
//!
//! ## Main Functionality
//! - `ClientContext::new`: validates the configuration once
//! - Factory methods per service client, given a transport
//!
//! ## ⚠️ Important Note for Next Developer
//! - Report servers are memoized per endpoint: the transport passed to
//!   the first `fog_report_client` call for an endpoint is the one used
//! - A factory for an absent config section returns `ConfigMissing`
//! - Every transport handed to a factory is wrapped in `TimeoutTransport`,
//!   so `[transport] timeout_secs` holds even if the transport has no
//!   deadline of its own
//!
//! ## Last Modified
//! v0.1.0 - Initial client context

use std::sync::Arc;

use tracing::{info, info_span, Span};

use mobattest_core::attest::AttestationVerifier;
use mobattest_core::AuthorityPublicKey;
use mobattest_transport::{TimeoutTransport, Transport};

use crate::clients::{
    ConsensusClient, FogBlockClient, FogKeyImageClient, FogMerkleProofClient, FogReportClient,
    FogReportValidator, FogUntrustedClient, FogViewClient, CONSENSUS_SERVICE,
    FOG_KEY_IMAGE_SERVICE, FOG_MERKLE_PROOF_SERVICE, FOG_VIEW_SERVICE,
};
use crate::config::{ClientConfig, FogReportConfig, ServiceConfig};
use crate::error::{ClientError, Result};
use crate::services::{
    AttestedConnection, EndpointId, ReportServerRegistry, ServiceDescriptor, UnattestedConnection,
};

/// Shared state for every client built in this process.
pub struct ClientContext {
    config: ClientConfig,
    authority: AuthorityPublicKey,
    reports: ReportServerRegistry,
    span: Span,
}

impl ClientContext {
    /// Creates a context from a configuration.
    ///
    /// # Errors
    /// Returns the first validation failure.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let authority = config.authority_key()?;
        let span = info_span!("mobattest_client");
        info!(parent: &span, authority = %authority, "Client context created");
        Ok(Self {
            config,
            authority,
            reports: ReportServerRegistry::new(),
            span,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the root span.
    #[must_use]
    pub const fn span(&self) -> &Span {
        &self.span
    }

    /// Returns the report server registry.
    #[must_use]
    pub const fn report_servers(&self) -> &ReportServerRegistry {
        &self.reports
    }

    fn section<'a>(section: &'a Option<ServiceConfig>, name: &str) -> Result<&'a ServiceConfig> {
        section
            .as_ref()
            .ok_or_else(|| ClientError::config_missing(name))
    }

    fn fog_report_section(&self) -> Result<&FogReportConfig> {
        self.config
            .fog_report
            .as_ref()
            .ok_or_else(|| ClientError::config_missing("fog_report"))
    }

    fn with_deadline(&self, transport: Arc<dyn Transport>) -> Arc<dyn Transport> {
        Arc::new(TimeoutTransport::new(
            transport,
            self.config.transport.timeout(),
        ))
    }

    fn attested(
        &self,
        service: ServiceDescriptor,
        config: &ServiceConfig,
        transport: Arc<dyn Transport>,
    ) -> AttestedConnection {
        let verifier = Arc::new(AttestationVerifier::new(self.authority, config.policy()));
        let transport = self.with_deadline(transport);
        self.span
            .in_scope(|| {
                AttestedConnection::new(service, config.responder_id.clone(), verifier, transport)
            })
            .with_timeout(self.config.transport.timeout())
            .with_authorization(self.config.transport.credentials())
    }

    fn unattested(&self, name: &'static str, transport: Arc<dyn Transport>) -> UnattestedConnection {
        self.span
            .in_scope(|| UnattestedConnection::new(name, self.with_deadline(transport)))
            .with_timeout(self.config.transport.timeout())
            .with_authorization(self.config.transport.credentials())
    }

    /// Builds the consensus client.
    ///
    /// # Errors
    /// `ConfigMissing` without a `[consensus]` section.
    pub fn consensus_client(&self, transport: Arc<dyn Transport>) -> Result<ConsensusClient> {
        let config = Self::section(&self.config.consensus, "consensus")?;
        Ok(ConsensusClient::new(self.attested(
            CONSENSUS_SERVICE,
            config,
            transport,
        )))
    }

    /// Builds the fog view client.
    ///
    /// # Errors
    /// `ConfigMissing` without a `[fog_view]` section.
    pub fn fog_view_client(&self, transport: Arc<dyn Transport>) -> Result<FogViewClient> {
        let config = Self::section(&self.config.fog_view, "fog_view")?;
        Ok(FogViewClient::new(self.attested(
            FOG_VIEW_SERVICE,
            config,
            transport,
        )))
    }

    /// Builds the fog merkle proof client.
    ///
    /// # Errors
    /// `ConfigMissing` without a `[fog_ledger]` section.
    pub fn fog_merkle_proof_client(
        &self,
        transport: Arc<dyn Transport>,
    ) -> Result<FogMerkleProofClient> {
        let config = Self::section(&self.config.fog_ledger, "fog_ledger")?;
        Ok(FogMerkleProofClient::new(self.attested(
            FOG_MERKLE_PROOF_SERVICE,
            config,
            transport,
        )))
    }

    /// Builds the fog key image client.
    ///
    /// # Errors
    /// `ConfigMissing` without a `[fog_ledger]` section.
    pub fn fog_key_image_client(&self, transport: Arc<dyn Transport>) -> Result<FogKeyImageClient> {
        let config = Self::section(&self.config.fog_ledger, "fog_ledger")?;
        Ok(FogKeyImageClient::new(self.attested(
            FOG_KEY_IMAGE_SERVICE,
            config,
            transport,
        )))
    }

    /// Builds the fog block client.
    ///
    /// # Errors
    /// `ConfigMissing` without a `[fog_ledger]` section.
    pub fn fog_block_client(&self, transport: Arc<dyn Transport>) -> Result<FogBlockClient> {
        Self::section(&self.config.fog_ledger, "fog_ledger")?;
        Ok(FogBlockClient::new(self.unattested("fog_block", transport)))
    }

    /// Builds the fog untrusted TxOut client.
    ///
    /// # Errors
    /// `ConfigMissing` without a `[fog_ledger]` section.
    pub fn fog_untrusted_client(&self, transport: Arc<dyn Transport>) -> Result<FogUntrustedClient> {
        Self::section(&self.config.fog_ledger, "fog_ledger")?;
        Ok(FogUntrustedClient::new(self.unattested("fog_untrusted", transport)))
    }

    /// Builds a fog report client sharing the endpoint's report cache.
    ///
    /// # Errors
    /// `ConfigMissing` without a `[fog_report]` section, `ConfigInvalid`
    /// for a uri without host.
    pub fn fog_report_client(&self, transport: Arc<dyn Transport>) -> Result<FogReportClient> {
        let config = self.fog_report_section()?;
        let endpoint = EndpointId::from_uri(&config.uri)?;
        let server = self
            .reports
            .server(&endpoint, || self.unattested("fog_report", transport));
        Ok(FogReportClient::new(server))
    }

    /// Builds the validator for fog report evidence.
    ///
    /// # Errors
    /// `ConfigMissing` without a `[fog_report]` section.
    pub fn fog_report_validator(&self) -> Result<FogReportValidator> {
        let config = self.fog_report_section()?;
        Ok(FogReportValidator::new(Arc::new(AttestationVerifier::new(
            self.authority,
            config.ingest_policy(),
        ))))
    }
}

// ============================================
// Tests
// ============================================
