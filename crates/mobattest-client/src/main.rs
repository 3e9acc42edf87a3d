// ============================================
// File: crates/mobattest-client/src/main.rs
// ============================================
//! # mobattest Operator CLI
//!
//! ## Creation Reason
//! Lets an operator check a client configuration before deploying it:
//! that it parses, that every service has a usable policy, and which
//! enclaves it will trust.
//!
//! ## Usage
//! ```bash
//! mobattest validate --config /etc/mobattest/client.toml
//! mobattest policy --config /etc/mobattest/client.toml
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - `RUST_LOG` overrides the `[logging] level` of the config file
//! - Logging starts after the config is read, so load errors of a file
//!   are reported at the default level
//!
//! ## Last Modified
//! v0.1.0 - Initial CLI implementation

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mobattest_client::config::{FogReportConfig, ServiceConfig};
use mobattest_client::{ClientConfig, ClientContext};
use mobattest_core::AttestationPolicy;

const DEFAULT_CONFIG: &str = "/etc/mobattest/client.toml";

// ============================================
// CLI Definition
// ============================================

/// mobattest attested client tools
#[derive(Parser, Debug)]
#[command(name = "mobattest")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },

    /// Print the attestation policies of a configuration file
    Policy {
        /// Path to configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },
}

// ============================================
// Main
// ============================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config_path = match &cli.command {
        Commands::Validate { config } | Commands::Policy { config } => config.clone(),
    };
    let loaded = ClientConfig::load(&config_path).await;
    let level = loaded
        .as_ref()
        .map_or("info", |config| config.logging.level.as_str());
    init_logging(level);

    let result = match loaded {
        Ok(config) => match cli.command {
            Commands::Validate { .. } => cmd_validate(&config_path, config),
            Commands::Policy { .. } => cmd_policy(&config),
        },
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

// ============================================
// Commands
// ============================================

/// Validates the configuration and summarizes it.
fn cmd_validate(path: &Path, config: ClientConfig) -> anyhow::Result<()> {
    let context = ClientContext::new(config)?;
    let config = context.config();

    println!("✅ Configuration is valid: {}", path.display());
    println!();
    println!("Transport:");
    println!("   Timeout:    {}s", config.transport.timeout_secs);
    println!(
        "   Auth:       {}",
        if config.transport.credentials().is_some() { "basic" } else { "none" }
    );
    println!();
    println!("Authority:");
    println!("   Key (hex):  {}", hex::encode(config.authority_key()?.to_bytes()));
    println!();

    print_service("Consensus", config.consensus.as_ref());
    print_service("Fog View", config.fog_view.as_ref());
    print_service("Fog Ledger", config.fog_ledger.as_ref());
    if let Some(fog_report) = &config.fog_report {
        print_fog_report(fog_report);
    }

    Ok(())
}

/// Prints every configured policy as JSON.
fn cmd_policy(config: &ClientConfig) -> anyhow::Result<()> {
    let sections = [
        ("consensus", config.consensus.as_ref().map(ServiceConfig::policy)),
        ("fog_view", config.fog_view.as_ref().map(ServiceConfig::policy)),
        ("fog_ledger", config.fog_ledger.as_ref().map(ServiceConfig::policy)),
        (
            "fog_report.ingest",
            config.fog_report.as_ref().map(FogReportConfig::ingest_policy),
        ),
    ];

    for (name, policy) in sections {
        if let Some(policy) = policy {
            print_policy(name, &policy)?;
        }
    }
    Ok(())
}

// ============================================
// Helper Functions
// ============================================

fn print_service(title: &str, service: Option<&ServiceConfig>) {
    let Some(service) = service else {
        return;
    };
    println!("{title}:");
    println!("   URI:        {}", service.uri);
    println!("   Responder:  {}", service.responder_id);
    println!("   Enclaves:   {}", service.enclaves.len());
    println!("   Signers:    {}", service.signers.len());
    println!();
}

fn print_fog_report(fog_report: &FogReportConfig) {
    println!("Fog Report:");
    println!("   URI:        {}", fog_report.uri);
    println!("   Enclaves:   {}", fog_report.ingest_enclaves.len());
    println!("   Signers:    {}", fog_report.ingest_signers.len());
    println!();
}

fn print_policy(name: &str, policy: &AttestationPolicy) -> anyhow::Result<()> {
    println!("[{name}]");
    println!("{}", serde_json::to_string_pretty(policy)?);
    println!();
    Ok(())
}

/// Initializes the logging system.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init()
        .ok();
}
