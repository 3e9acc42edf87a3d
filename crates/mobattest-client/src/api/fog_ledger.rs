// ============================================
// File: crates/mobattest-client/src/api/fog_ledger.rs
// ============================================
//! Fog ledger API messages: merkle proofs and key images (attested),
//! blocks and untrusted TxOut lookups (unattested).

// ============================================
// Merkle proofs
// ============================================

/// Request for TxOuts and their membership proofs.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetOutputsRequest {
    /// Global TxOut indices.
    #[prost(uint64, repeated, tag = "1")]
    pub indices: Vec<u64>,
    /// Block whose merkle root the proofs must be against.
    #[prost(uint64, tag = "2")]
    pub merkle_root_block: u64,
}

/// One requested output.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OutputResult {
    /// Global index requested.
    #[prost(fixed64, tag = "1")]
    pub index: u64,
    /// Exists / does not exist / error.
    #[prost(fixed32, tag = "2")]
    pub result_code: u32,
    /// Encoded TxOut.
    #[prost(bytes = "vec", tag = "3")]
    pub output: Vec<u8>,
    /// Encoded membership proof.
    #[prost(bytes = "vec", tag = "4")]
    pub proof: Vec<u8>,
}

/// Outputs and proofs.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetOutputsResponse {
    /// Results, in request order.
    #[prost(message, repeated, tag = "1")]
    pub results: Vec<OutputResult>,
    /// Ledger height.
    #[prost(uint64, tag = "2")]
    pub num_blocks: u64,
    /// Total TxOuts in the ledger.
    #[prost(uint64, tag = "3")]
    pub global_txo_count: u64,
}

// ============================================
// Key images
// ============================================

/// One key image to check.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KeyImageQuery {
    /// The key image.
    #[prost(bytes = "vec", tag = "1")]
    pub key_image: Vec<u8>,
    /// Only consider blocks from here on.
    #[prost(fixed64, tag = "2")]
    pub start_block: u64,
}

/// Key image check request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CheckKeyImagesRequest {
    /// Queries.
    #[prost(message, repeated, tag = "1")]
    pub queries: Vec<KeyImageQuery>,
}

/// One key image's status.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KeyImageResult {
    /// The key image.
    #[prost(bytes = "vec", tag = "1")]
    pub key_image: Vec<u8>,
    /// Block it was spent in, if spent.
    #[prost(fixed64, tag = "2")]
    pub spent_at: u64,
    /// Timestamp of that block.
    #[prost(fixed64, tag = "3")]
    pub timestamp: u64,
    /// Spent / not spent / error.
    #[prost(fixed32, tag = "4")]
    pub key_image_result_code: u32,
}

/// Key image check response.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CheckKeyImagesResponse {
    /// Ledger height.
    #[prost(uint64, tag = "1")]
    pub num_blocks: u64,
    /// Results, in request order.
    #[prost(message, repeated, tag = "2")]
    pub results: Vec<KeyImageResult>,
    /// Total TxOuts in the ledger.
    #[prost(uint64, tag = "3")]
    pub global_txo_count: u64,
}

// ============================================
// Blocks (unattested)
// ============================================

/// Half-open block range `[start_block, end_block)`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlockRange {
    /// First block.
    #[prost(uint64, tag = "1")]
    pub start_block: u64,
    /// One past the last block.
    #[prost(uint64, tag = "2")]
    pub end_block: u64,
}

/// Block fetch request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlockRequest {
    /// Ranges to fetch.
    #[prost(message, repeated, tag = "1")]
    pub ranges: Vec<BlockRange>,
}

/// One block's outputs.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlockData {
    /// Block index.
    #[prost(uint64, tag = "1")]
    pub index: u64,
    /// TxOuts in the ledger after this block.
    #[prost(uint64, tag = "2")]
    pub global_txo_count: u64,
    /// Encoded TxOuts.
    #[prost(bytes = "vec", repeated, tag = "3")]
    pub outputs: Vec<Vec<u8>>,
    /// Block timestamp.
    #[prost(uint64, tag = "4")]
    pub timestamp: u64,
}

/// Block fetch response.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlockResponse {
    /// Blocks.
    #[prost(message, repeated, tag = "1")]
    pub blocks: Vec<BlockData>,
    /// Ledger height.
    #[prost(uint64, tag = "2")]
    pub num_blocks: u64,
    /// Total TxOuts in the ledger.
    #[prost(uint64, tag = "3")]
    pub global_txo_count: u64,
}

// ============================================
// Untrusted TxOuts (unattested)
// ============================================

/// Lookup of TxOuts by public key.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxOutRequest {
    /// Compressed TxOut public keys.
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub tx_out_pubkeys: Vec<Vec<u8>>,
}

/// One TxOut lookup result.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxOutResult {
    /// Public key queried.
    #[prost(bytes = "vec", tag = "1")]
    pub tx_out_pubkey: Vec<u8>,
    /// Found / not found / error.
    #[prost(uint32, tag = "2")]
    pub result_code: u32,
    /// Global index, if found.
    #[prost(uint64, tag = "3")]
    pub tx_out_global_index: u64,
    /// Block containing the TxOut.
    #[prost(uint64, tag = "4")]
    pub block_index: u64,
    /// Timestamp of that block.
    #[prost(uint64, tag = "5")]
    pub timestamp: u64,
}

/// TxOut lookup response.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxOutResponse {
    /// Ledger height.
    #[prost(uint64, tag = "1")]
    pub num_blocks: u64,
    /// Results, in request order.
    #[prost(message, repeated, tag = "2")]
    pub results: Vec<TxOutResult>,
    /// Total TxOuts in the ledger.
    #[prost(uint64, tag = "3")]
    pub global_txo_count: u64,
}
