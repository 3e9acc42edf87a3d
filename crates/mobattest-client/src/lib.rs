// ============================================
// File: crates/mobattest-client/src/lib.rs
// ============================================
//! # mobattest Client - Attested Service Connections
//!
//! ## Creation Reason
//! Turns the handshake and cipher primitives of `mobattest-core` into
//! connections an application can call: consensus, fog view, fog ledger
//! and fog report services.
//!
//! ## Main Functionality
//!
//! ### Services Module ([`services`])
//! - `AttestedConnection`: lazy attestation, sealed calls, one retry
//! - `UnattestedConnection`: plain calls to non-enclave endpoints
//! - `ReportServer` / `ReportServerRegistry`: cached single-flight reports
//!
//! ### Clients Module ([`clients`])
//! - One typed client per remote API
//! - `FogReportValidator`: fog ingest key extraction
//!
//! ### Support
//! - [`config`]: TOML configuration
//! - [`context`]: `ClientContext`, the per-process owner of shared state
//! - [`error`]: `ClientError` and its classification
//! - [`api`]: protobuf messages and method paths
//!
//! ## Usage
//! ```ignore
//! let config = ClientConfig::load("/etc/mobattest/client.toml").await?;
//! let context = ClientContext::new(config)?;
//! let consensus = context.consensus_client(transport)?;
//! let response = consensus.propose_tx(&ProposeTxRequest { tx }).await?;
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - The transport is injected; this crate never opens sockets itself
//! - Keep every wire payload of an attested service inside an
//!   `AttestedMessage`
//!
//! ## Last Modified
//! v0.1.0 - Initial implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod clients;
pub mod config;
pub mod context;
pub mod error;
pub mod services;

#[cfg(test)]
mod testing;

// Re-export commonly used items
pub use clients::{
    ConsensusClient, FogBlockClient, FogKeyImageClient, FogMerkleProofClient, FogPublicKey,
    FogReportClient, FogReportValidator, FogUntrustedClient, FogViewClient,
};
pub use config::ClientConfig;
pub use context::ClientContext;
pub use error::{ClientError, ErrorClass, Result};
pub use services::{
    AttestedConnection, EndpointId, ReportRequirement, ReportServer, ReportServerRegistry,
    ServiceDescriptor, UnattestedConnection,
};
