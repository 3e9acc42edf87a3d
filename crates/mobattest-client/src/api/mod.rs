// ============================================
// File: crates/mobattest-client/src/api/mod.rs
// ============================================
//! # Service API Messages
//!
//! ## Creation Reason
//! Protobuf request/response types of the consensus and Fog services,
//! declared with `prost` derives (no build-time codegen).
//!
//! ## Main Functionality
//! - [`consensus`]: Transaction proposal
//! - [`fog_view`]: View queries and their AAD
//! - [`fog_ledger`]: Merkle proofs, key images, blocks, untrusted TxOuts
//! - [`report`]: Fog ingest reports
//! - [`paths`]: gRPC method paths
//!
//! ## ⚠️ Important Note for Next Developer
//! - Tag numbers must match the services' `.proto` files exactly
//! - Transactions and TxOuts stay opaque bytes; this crate never builds them
//!
//! ## Last Modified
//! v0.1.0 - Initial API definitions

pub mod consensus;
pub mod fog_ledger;
pub mod fog_view;
pub mod report;

/// gRPC method paths.
pub mod paths {
    /// Consensus attestation handshake.
    pub const CONSENSUS_AUTH: &str = "/attest.AttestedApi/Auth";
    /// Consensus transaction proposal.
    pub const CONSENSUS_PROPOSE_TX: &str = "/consensus_client.ConsensusClientAPI/ClientTxPropose";

    /// Fog view attestation handshake.
    pub const FOG_VIEW_AUTH: &str = "/fog_view.FogViewAPI/Auth";
    /// Fog view query.
    pub const FOG_VIEW_QUERY: &str = "/fog_view.FogViewAPI/Query";

    /// Fog merkle proof attestation handshake.
    pub const FOG_MERKLE_PROOF_AUTH: &str = "/fog_ledger.FogMerkleProofAPI/Auth";
    /// Fog merkle proof lookup.
    pub const FOG_MERKLE_PROOF_GET_OUTPUTS: &str = "/fog_ledger.FogMerkleProofAPI/GetOutputs";

    /// Fog key image attestation handshake.
    pub const FOG_KEY_IMAGE_AUTH: &str = "/fog_ledger.FogKeyImageAPI/Auth";
    /// Fog key image check.
    pub const FOG_KEY_IMAGE_CHECK: &str = "/fog_ledger.FogKeyImageAPI/CheckKeyImages";

    /// Fog block fetch (unattested).
    pub const FOG_BLOCK_GET_BLOCKS: &str = "/fog_ledger.FogBlockAPI/GetBlocks";
    /// Fog untrusted TxOut lookup (unattested).
    pub const FOG_UNTRUSTED_GET_TX_OUTS: &str = "/fog_ledger.FogUntrustedTxOutApi/GetTxOuts";

    /// Fog report fetch (unattested).
    pub const FOG_REPORT_GET_REPORTS: &str = "/report.ReportAPI/GetReports";
}
