// ============================================
// File: crates/mobattest-client/src/config.rs
// ============================================
//! # Client Configuration
//!
//! ## Creation Reason
//! Provides configuration for the attested service clients, loaded from
//! a TOML file.
//!
//! ## Main Functionality
//! - `ClientConfig`: Main configuration structure
//! - TOML file loading and parsing
//! - Configuration validation
//! - Conversion of measurement lists into `AttestationPolicy` values
//!
//! ## Configuration Sections
//! - `transport`: Call timeout, optional basic-auth credentials
//! - `authority`: Public key of the attestation evidence signer (REQUIRED)
//! - `consensus` / `fog_view` / `fog_ledger`: Attested services
//! - `fog_report`: Report server and fog ingest enclave policy
//! - `logging`: Log level
//!
//! ## Example Configuration
//! ```toml
//! [transport]
//! timeout_secs = 30
//!
//! [authority]
//! public_key = "<base64 ed25519 key>"
//!
//! [consensus]
//! uri = "https://node1.example.com:443"
//! responder_id = "node1.example.com:443"
//!
//! [[consensus.enclaves]]
//! mr_enclave = "<64 hex chars>"
//! hardening_advisories = ["INTEL-SA-00334"]
//!
//! [fog_report]
//! uri = "https://fog.example.com:443"
//!
//! [[fog_report.ingest_signers]]
//! mr_signer = "<64 hex chars>"
//! product_id = 4
//! minimum_security_version = 1
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Measurements and responder ids are checked while parsing; a bad value
//!   surfaces as `ConfigLoad`, not `ConfigInvalid`
//! - A service section without any enclave or signer entry is rejected,
//!   an empty policy would trust nothing and fail every handshake
//!
//! ## Last Modified
//! v0.1.0 - Initial configuration implementation

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use mobattest_common::ResponderId;
use mobattest_core::attest::{AttestationPolicy, EnclaveMeasurement, SignerMeasurement};
use mobattest_core::AuthorityPublicKey;
use mobattest_transport::BasicCredentials;

use crate::error::{ClientError, Result};

// ============================================
// ClientConfig
// ============================================

/// Main client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Transport settings.
    #[serde(default)]
    pub transport: TransportConfig,

    /// Attestation authority (REQUIRED).
    #[serde(default)]
    pub authority: Option<AuthorityConfig>,

    /// Consensus node.
    #[serde(default)]
    pub consensus: Option<ServiceConfig>,

    /// Fog view service.
    #[serde(default)]
    pub fog_view: Option<ServiceConfig>,

    /// Fog ledger services (merkle proofs, key images, blocks, TxOuts).
    #[serde(default)]
    pub fog_ledger: Option<ServiceConfig>,

    /// Fog report server.
    #[serde(default)]
    pub fog_report: Option<FogReportConfig>,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ClientConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed or validated.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        info!("Loading configuration from: {}", path_str);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ClientError::config_load(&path_str, e.to_string()))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ClientError::config_load(&path_str, e.to_string()))?;

        config.validate()?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Loads configuration from a string.
    ///
    /// # Errors
    /// Returns error if the content cannot be parsed or validated.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ClientError::config_load("<string>", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns the first invalid or missing field.
    pub fn validate(&self) -> Result<()> {
        self.transport.validate()?;

        if self.authority.is_none() {
            return Err(ClientError::config_missing("authority.public_key"));
        }

        if let Some(consensus) = &self.consensus {
            consensus.validate("consensus")?;
        }
        if let Some(fog_view) = &self.fog_view {
            fog_view.validate("fog_view")?;
        }
        if let Some(fog_ledger) = &self.fog_ledger {
            fog_ledger.validate("fog_ledger")?;
        }
        if let Some(fog_report) = &self.fog_report {
            fog_report.validate()?;
        }

        Ok(())
    }

    /// Returns the attestation authority key.
    ///
    /// # Errors
    /// Returns `ConfigMissing` if the `[authority]` section is absent.
    pub fn authority_key(&self) -> Result<AuthorityPublicKey> {
        self.authority
            .as_ref()
            .map(|a| a.public_key)
            .ok_or_else(|| ClientError::config_missing("authority.public_key"))
    }
}

// ============================================
// TransportConfig
// ============================================

/// Transport configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Basic-auth username.
    #[serde(default)]
    pub username: Option<String>,

    /// Basic-auth password.
    #[serde(default)]
    pub password: Option<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

impl TransportConfig {
    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(ClientError::config_invalid(
                "transport.timeout_secs",
                "must be greater than 0",
            ));
        }

        if self.username.is_some() != self.password.is_some() {
            return Err(ClientError::config_invalid(
                "transport.username",
                "username and password must be set together",
            ));
        }

        Ok(())
    }

    /// Returns the per-call timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the configured credentials, if any.
    #[must_use]
    pub fn credentials(&self) -> Option<BasicCredentials> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(BasicCredentials::new(user.clone(), pass.clone())),
            _ => None,
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            username: None,
            password: None,
        }
    }
}

// ============================================
// AuthorityConfig
// ============================================

/// Attestation authority section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorityConfig {
    /// Base64 Ed25519 key that signs enclave evidence.
    pub public_key: AuthorityPublicKey,
}

// ============================================
// ServiceConfig
// ============================================

/// One attested service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service URI.
    pub uri: String,

    /// Identity the enclave must answer for.
    pub responder_id: ResponderId,

    /// Accepted enclave builds.
    #[serde(default)]
    pub enclaves: Vec<EnclaveMeasurement>,

    /// Accepted enclave signers.
    #[serde(default)]
    pub signers: Vec<SignerMeasurement>,
}

impl ServiceConfig {
    fn validate(&self, section: &str) -> Result<()> {
        if self.uri.trim().is_empty() {
            return Err(ClientError::config_invalid(
                format!("{section}.uri"),
                "must not be empty",
            ));
        }

        if self.enclaves.is_empty() && self.signers.is_empty() {
            return Err(ClientError::config_invalid(
                format!("{section}.enclaves"),
                "at least one enclave or signer entry is required",
            ));
        }

        Ok(())
    }

    /// Builds the attestation policy for this service.
    #[must_use]
    pub fn policy(&self) -> AttestationPolicy {
        build_policy(&self.enclaves, &self.signers)
    }
}

// ============================================
// FogReportConfig
// ============================================

/// Fog report server section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FogReportConfig {
    /// Report server URI.
    pub uri: String,

    /// Accepted fog ingest enclave builds.
    #[serde(default)]
    pub ingest_enclaves: Vec<EnclaveMeasurement>,

    /// Accepted fog ingest enclave signers.
    #[serde(default)]
    pub ingest_signers: Vec<SignerMeasurement>,
}

impl FogReportConfig {
    fn validate(&self) -> Result<()> {
        if self.uri.trim().is_empty() {
            return Err(ClientError::config_invalid(
                "fog_report.uri",
                "must not be empty",
            ));
        }

        if self.ingest_enclaves.is_empty() && self.ingest_signers.is_empty() {
            return Err(ClientError::config_invalid(
                "fog_report.ingest_enclaves",
                "at least one enclave or signer entry is required",
            ));
        }

        Ok(())
    }

    /// Builds the policy applied to evidence carried in fog reports.
    #[must_use]
    pub fn ingest_policy(&self) -> AttestationPolicy {
        build_policy(&self.ingest_enclaves, &self.ingest_signers)
    }
}

fn build_policy(enclaves: &[EnclaveMeasurement], signers: &[SignerMeasurement]) -> AttestationPolicy {
    let policy = enclaves
        .iter()
        .cloned()
        .fold(AttestationPolicy::new(), AttestationPolicy::with_enclave);
    signers
        .iter()
        .cloned()
        .fold(policy, AttestationPolicy::with_signer)
}

// ============================================
// LoggingConfig
// ============================================

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use mobattest_core::testing;

    fn authority_section() -> String {
        format!(
            "[authority]\npublic_key = \"{}\"\n",
            testing::authority().public_key()
        )
    }

    fn full_config() -> String {
        let mr = testing::deadbeef();
        format!(
            r#"
            [transport]
            timeout_secs = 10
            username = "alice"
            password = "s3cret"

            {authority}

            [consensus]
            uri = "https://node1.example.com:443"
            responder_id = "node1.example.com:443"

            [[consensus.enclaves]]
            mr_enclave = "{mr}"
            hardening_advisories = ["INTEL-SA-00334"]

            [fog_report]
            uri = "https://fog.example.com:443"

            [[fog_report.ingest_signers]]
            mr_signer = "{signer}"
            product_id = 4
            minimum_security_version = 1

            [logging]
            level = "debug"
            "#,
            authority = authority_section(),
            signer = testing::FIXTURE_SIGNER,
        )
    }

    #[test]
    fn test_full_config() {
        let config = ClientConfig::from_str(&full_config()).unwrap();

        assert_eq!(config.transport.timeout(), Duration::from_secs(10));
        assert_eq!(config.transport.credentials().unwrap().username(), "alice");
        assert_eq!(
            config.authority_key().unwrap(),
            testing::authority().public_key()
        );

        let consensus = config.consensus.as_ref().unwrap();
        assert_eq!(consensus.responder_id.as_str(), "node1.example.com:443");
        let policy = consensus.policy();
        assert_eq!(policy.len(), 1);
        assert_eq!(policy.enclaves()[0].mr_enclave, testing::deadbeef());
        assert_eq!(
            policy.enclaves()[0].hardening_advisories,
            vec!["INTEL-SA-00334".to_string()]
        );

        let fog_report = config.fog_report.as_ref().unwrap();
        assert_eq!(fog_report.ingest_policy().signers()[0].product_id, 4);

        assert!(config.fog_view.is_none());
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_str(&authority_section()).unwrap();
        assert_eq!(config.transport.timeout_secs, 30);
        assert!(config.transport.credentials().is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_authority() {
        let err = ClientConfig::from_str("[logging]\nlevel = \"info\"\n").unwrap_err();
        assert!(matches!(err, ClientError::ConfigMissing { ref field } if field == "authority.public_key"));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_empty_policy_rejected() {
        let toml = format!(
            "{}\n[fog_view]\nuri = \"https://view.example.com\"\nresponder_id = \"view.example.com:443\"\n",
            authority_section()
        );
        let err = ClientConfig::from_str(&toml).unwrap_err();
        assert!(matches!(err, ClientError::ConfigInvalid { ref field, .. } if field == "fog_view.enclaves"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let toml = format!("[transport]\ntimeout_secs = 0\n{}", authority_section());
        let err = ClientConfig::from_str(&toml).unwrap_err();
        assert!(matches!(err, ClientError::ConfigInvalid { ref field, .. } if field == "transport.timeout_secs"));
    }

    #[test]
    fn test_half_credentials_rejected() {
        let toml = format!("[transport]\nusername = \"alice\"\n{}", authority_section());
        assert!(ClientConfig::from_str(&toml).is_err());
    }

    #[test]
    fn test_malformed_measurement() {
        let toml = format!(
            "{}\n[consensus]\nuri = \"u\"\nresponder_id = \"r\"\n[[consensus.enclaves]]\nmr_enclave = \"zz\"\n",
            authority_section()
        );
        let err = ClientConfig::from_str(&toml).unwrap_err();
        assert!(matches!(err, ClientError::ConfigLoad { .. }));
    }

    #[test]
    fn test_empty_responder_id() {
        let toml = format!(
            "{}\n[consensus]\nuri = \"u\"\nresponder_id = \"\"\n[[consensus.enclaves]]\nmr_enclave = \"{}\"\n",
            authority_section(),
            testing::deadbeef()
        );
        assert!(matches!(
            ClientConfig::from_str(&toml).unwrap_err(),
            ClientError::ConfigLoad { .. }
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = ClientConfig::load("/nonexistent/mobattest.toml").await.unwrap_err();
        assert!(matches!(err, ClientError::ConfigLoad { ref path, .. } if path.contains("nonexistent")));
    }
}
