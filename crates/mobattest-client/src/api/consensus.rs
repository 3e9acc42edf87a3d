// ============================================
// File: crates/mobattest-client/src/api/consensus.rs
// ============================================
//! Consensus client API messages.

/// Outcome of a transaction proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ProposeTxResult {
    /// Accepted for consideration.
    Ok = 0,
    /// Inputs and membership proofs disagree in count.
    InputsProofsLengthMismatch = 10,
    /// No inputs.
    NoInputs = 11,
    /// Too many inputs.
    TooManyInputs = 12,
    /// Missing input signatures.
    InsufficientInputSignatures = 13,
    /// An input signature is invalid.
    InvalidInputSignature = 14,
    /// The transaction signature is invalid.
    InvalidTransactionSignature = 15,
    /// A range proof is invalid.
    InvalidRangeProof = 16,
    /// Ring size too small.
    InsufficientRingSize = 17,
    /// Tombstone block already passed.
    TombstoneBlockExceeded = 18,
    /// Tombstone block too far in the future.
    TombstoneBlockTooFar = 19,
    /// No outputs.
    NoOutputs = 20,
    /// Too many outputs.
    TooManyOutputs = 21,
    /// A key image was already spent.
    ContainsSpentKeyImage = 27,
    /// Key images repeat within the transaction.
    DuplicateKeyImages = 28,
    /// Fee rejected.
    TxFeeError = 37,
}

/// A serialized transaction to propose.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProposeTxRequest {
    /// Encoded `Tx` (opaque to this crate).
    #[prost(bytes = "vec", tag = "1")]
    pub tx: Vec<u8>,
}

/// Consensus answer to a proposal.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProposeTxResponse {
    /// Proposal outcome.
    #[prost(enumeration = "ProposeTxResult", tag = "1")]
    pub result: i32,
    /// Blocks in the ledger when the proposal was evaluated.
    #[prost(uint64, tag = "2")]
    pub block_count: u64,
    /// Block format version of the network.
    #[prost(uint32, tag = "3")]
    pub block_version: u32,
    /// Human-readable detail for rejections.
    #[prost(string, tag = "4")]
    pub err_msg: String,
}

impl ProposeTxResponse {
    /// Returns `true` if the transaction was accepted.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result == ProposeTxResult::Ok as i32
    }
}
