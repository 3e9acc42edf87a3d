// ============================================
// File: crates/mobattest-client/src/api/fog_view.rs
// ============================================
//! Fog view API messages.
//!
//! `QueryRequestAad` travels as the AAD of the attested envelope: the
//! server reads the cursor in the clear while the search keys stay
//! encrypted.

/// Cursor sent as the attested message AAD.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryRequestAad {
    /// Resume the user event stream after this id.
    #[prost(int64, tag = "1")]
    pub start_from_user_event_id: i64,
    /// Resume the block scan at this index.
    #[prost(uint64, tag = "2")]
    pub start_from_block_index: u64,
}

/// Encrypted part of a view query.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryRequest {
    /// Search keys of the TxOuts to look up.
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub get_txos: Vec<Vec<u8>>,
}

/// One search key's result.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxOutSearchResult {
    /// The search key queried.
    #[prost(bytes = "vec", tag = "1")]
    pub search_key: Vec<u8>,
    /// Found / not found / bad search key.
    #[prost(uint32, tag = "2")]
    pub result_code: u32,
    /// Encrypted TxOut record.
    #[prost(bytes = "vec", tag = "3")]
    pub ciphertext: Vec<u8>,
}

/// View query response.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryResponse {
    /// Blocks processed by the view enclave.
    #[prost(uint64, tag = "1")]
    pub highest_processed_block_count: u64,
    /// Timestamp of the highest processed block.
    #[prost(uint64, tag = "2")]
    pub highest_processed_block_signature_timestamp: u64,
    /// Cursor for the next query.
    #[prost(int64, tag = "3")]
    pub next_start_from_user_event_id: i64,
    /// Results, one per search key.
    #[prost(message, repeated, tag = "4")]
    pub tx_out_search_results: Vec<TxOutSearchResult>,
    /// Ledger height known to the view enclave.
    #[prost(uint64, tag = "5")]
    pub last_known_block_count: u64,
}
