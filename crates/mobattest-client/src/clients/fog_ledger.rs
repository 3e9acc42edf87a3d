// ============================================
// File: crates/mobattest-client/src/clients/fog_ledger.rs
// ============================================
//! # Fog Ledger Clients
//!
//! ## Creation Reason
//! The fog ledger server hosts four APIs. Two run inside enclaves
//! (membership proofs and key images, whose queries leak spending
//! behaviour) and two are plain (blocks and TxOut lookups, verifiable
//! against the ledger).
//!
//! ## Main Functionality
//! - `FogMerkleProofClient::get_outputs` (attested)
//! - `FogKeyImageClient::check_key_images` (attested)
//! - `FogBlockClient::get_blocks` (unattested)
//! - `FogUntrustedClient::get_untrusted_txouts` (unattested)
//!
//! ## Last Modified
//! v0.1.0 - Initial fog ledger clients

use crate::api::fog_ledger::{
    BlockRequest, BlockResponse, CheckKeyImagesRequest, CheckKeyImagesResponse,
    GetOutputsRequest, GetOutputsResponse, TxOutRequest, TxOutResponse,
};
use crate::api::paths;
use crate::error::Result;
use crate::services::connection::{AttestedConnection, ServiceDescriptor};
use crate::services::unattested::UnattestedConnection;

/// Merkle proof service description.
pub const FOG_MERKLE_PROOF_SERVICE: ServiceDescriptor =
    ServiceDescriptor::new("fog_merkle_proof", paths::FOG_MERKLE_PROOF_AUTH);

/// Key image service description.
pub const FOG_KEY_IMAGE_SERVICE: ServiceDescriptor =
    ServiceDescriptor::new("fog_key_image", paths::FOG_KEY_IMAGE_AUTH);

// ============================================
// Attested
// ============================================

/// Attested membership proof client.
#[derive(Debug)]
pub struct FogMerkleProofClient {
    connection: AttestedConnection,
}

impl FogMerkleProofClient {
    /// Wraps a connection built for [`FOG_MERKLE_PROOF_SERVICE`].
    #[must_use]
    pub const fn new(connection: AttestedConnection) -> Self {
        Self { connection }
    }

    /// Returns the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &AttestedConnection {
        &self.connection
    }

    /// Fetches TxOuts with membership proofs.
    ///
    /// # Errors
    /// See [`AttestedConnection::call`].
    pub async fn get_outputs(&self, request: &GetOutputsRequest) -> Result<GetOutputsResponse> {
        self.connection
            .call(paths::FOG_MERKLE_PROOF_GET_OUTPUTS, &[], request)
            .await
    }
}

/// Attested key image client.
#[derive(Debug)]
pub struct FogKeyImageClient {
    connection: AttestedConnection,
}

impl FogKeyImageClient {
    /// Wraps a connection built for [`FOG_KEY_IMAGE_SERVICE`].
    #[must_use]
    pub const fn new(connection: AttestedConnection) -> Self {
        Self { connection }
    }

    /// Returns the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &AttestedConnection {
        &self.connection
    }

    /// Checks whether key images were spent.
    ///
    /// # Errors
    /// See [`AttestedConnection::call`].
    pub async fn check_key_images(
        &self,
        request: &CheckKeyImagesRequest,
    ) -> Result<CheckKeyImagesResponse> {
        self.connection
            .call(paths::FOG_KEY_IMAGE_CHECK, &[], request)
            .await
    }
}

// ============================================
// Unattested
// ============================================

/// Block fetch client.
#[derive(Debug)]
pub struct FogBlockClient {
    connection: UnattestedConnection,
}

impl FogBlockClient {
    /// Wraps a connection.
    #[must_use]
    pub const fn new(connection: UnattestedConnection) -> Self {
        Self { connection }
    }

    /// Fetches block ranges.
    ///
    /// # Errors
    /// See [`UnattestedConnection::call`].
    pub async fn get_blocks(&self, request: &BlockRequest) -> Result<BlockResponse> {
        self.connection
            .call(paths::FOG_BLOCK_GET_BLOCKS, request)
            .await
    }
}

/// Untrusted TxOut lookup client.
#[derive(Debug)]
pub struct FogUntrustedClient {
    connection: UnattestedConnection,
}

impl FogUntrustedClient {
    /// Wraps a connection.
    #[must_use]
    pub const fn new(connection: UnattestedConnection) -> Self {
        Self { connection }
    }

    /// Looks up TxOuts by public key.
    ///
    /// # Errors
    /// See [`UnattestedConnection::call`].
    pub async fn get_untrusted_txouts(&self, request: &TxOutRequest) -> Result<TxOutResponse> {
        self.connection
            .call(paths::FOG_UNTRUSTED_GET_TX_OUTS, request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use prost::Message;

    use super::*;
    use crate::api::fog_ledger::{
        BlockData, BlockRange, KeyImageQuery, KeyImageResult, OutputResult, TxOutResult,
    };
    use crate::testing::{FakeEnclave, FAKE_RESPONDER};
    use mobattest_common::ResponderId;
    use mobattest_core::testing;
    use mobattest_transport::mock::MockTransport;

    fn attested(enclave: &Arc<FakeEnclave>, service: ServiceDescriptor) -> AttestedConnection {
        AttestedConnection::new(
            service,
            ResponderId::new(FAKE_RESPONDER).unwrap(),
            Arc::new(testing::verifier_for(testing::deadbeef())),
            Arc::new(enclave.transport()),
        )
    }

    #[tokio::test]
    async fn test_get_outputs() {
        let enclave = FakeEnclave::new(paths::FOG_MERKLE_PROOF_AUTH, testing::deadbeef(), |_, body| {
            let request = GetOutputsRequest::decode(body).unwrap();
            GetOutputsResponse {
                results: request
                    .indices
                    .iter()
                    .map(|&index| OutputResult {
                        index,
                        result_code: 1,
                        output: vec![0x0a],
                        proof: vec![0x0b],
                    })
                    .collect(),
                num_blocks: 9,
                global_txo_count: 90,
            }
            .encode_to_vec()
        });
        let client = FogMerkleProofClient::new(attested(&enclave, FOG_MERKLE_PROOF_SERVICE));

        let response = client
            .get_outputs(&GetOutputsRequest {
                indices: vec![3, 5],
                merkle_root_block: 8,
            })
            .await
            .unwrap();
        let indices: Vec<u64> = response.results.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![3, 5]);
        assert_eq!(response.num_blocks, 9);
    }

    #[tokio::test]
    async fn test_check_key_images() {
        let enclave = FakeEnclave::new(paths::FOG_KEY_IMAGE_AUTH, testing::deadbeef(), |_, body| {
            let request = CheckKeyImagesRequest::decode(body).unwrap();
            CheckKeyImagesResponse {
                num_blocks: 12,
                results: request
                    .queries
                    .into_iter()
                    .map(|q| KeyImageResult {
                        key_image: q.key_image,
                        spent_at: 11,
                        timestamp: 0,
                        key_image_result_code: 1,
                    })
                    .collect(),
                global_txo_count: 0,
            }
            .encode_to_vec()
        });
        let client = FogKeyImageClient::new(attested(&enclave, FOG_KEY_IMAGE_SERVICE));

        let response = client
            .check_key_images(&CheckKeyImagesRequest {
                queries: vec![KeyImageQuery {
                    key_image: vec![0x77; 32],
                    start_block: 0,
                }],
            })
            .await
            .unwrap();
        assert_eq!(response.results[0].key_image, vec![0x77; 32]);
        assert_eq!(response.results[0].spent_at, 11);
    }

    #[tokio::test]
    async fn test_unattested_ledger_calls() {
        let mock = Arc::new(MockTransport::new(|path, _| {
            Ok(match path {
                paths::FOG_BLOCK_GET_BLOCKS => BlockResponse {
                    blocks: vec![BlockData {
                        index: 4,
                        global_txo_count: 40,
                        outputs: vec![vec![1]],
                        timestamp: 1_700_000_000,
                    }],
                    num_blocks: 5,
                    global_txo_count: 41,
                }
                .encode_to_vec(),
                _ => TxOutResponse {
                    num_blocks: 5,
                    results: vec![TxOutResult {
                        tx_out_pubkey: vec![2],
                        result_code: 1,
                        tx_out_global_index: 17,
                        block_index: 4,
                        timestamp: 1_700_000_000,
                    }],
                    global_txo_count: 41,
                }
                .encode_to_vec(),
            })
        }));

        let blocks = FogBlockClient::new(UnattestedConnection::new("fog_block", mock.clone()))
            .get_blocks(&BlockRequest {
                ranges: vec![BlockRange {
                    start_block: 4,
                    end_block: 5,
                }],
            })
            .await
            .unwrap();
        assert_eq!(blocks.blocks[0].index, 4);

        let txouts = FogUntrustedClient::new(UnattestedConnection::new("fog_untrusted", mock.clone()))
            .get_untrusted_txouts(&TxOutRequest {
                tx_out_pubkeys: vec![vec![2]],
            })
            .await
            .unwrap();
        assert_eq!(txouts.results[0].tx_out_global_index, 17);

        assert_eq!(mock.call_count(paths::FOG_BLOCK_GET_BLOCKS), 1);
        assert_eq!(mock.call_count(paths::FOG_UNTRUSTED_GET_TX_OUTS), 1);
    }
}
