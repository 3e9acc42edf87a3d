// ============================================
// File: crates/mobattest-client/src/clients/mod.rs
// ============================================
//! # Service Clients
//!
//! ## Creation Reason
//! One thin client per remote API, each a typed facade over a generic
//! connection. None of them adds protocol logic of its own.
//!
//! ## Main Functionality
//!
//! ### Submodules
//! - [`consensus`]: Transaction proposal (attested)
//! - [`fog_view`]: View queries (attested)
//! - [`fog_ledger`]: Merkle proofs, key images (attested), blocks, TxOuts
//! - [`fog_report`]: Fog reports (cached) and their validation
//!
//! ## Last Modified
//! v0.1.0 - Initial service clients

pub mod consensus;
pub mod fog_ledger;
pub mod fog_report;
pub mod fog_view;

// Re-export primary types
pub use consensus::{ConsensusClient, CONSENSUS_SERVICE};
pub use fog_ledger::{
    FogBlockClient, FogKeyImageClient, FogMerkleProofClient, FogUntrustedClient,
    FOG_KEY_IMAGE_SERVICE, FOG_MERKLE_PROOF_SERVICE,
};
pub use fog_report::{FogPublicKey, FogReportClient, FogReportValidator};
pub use fog_view::{FogViewClient, FOG_VIEW_SERVICE};
