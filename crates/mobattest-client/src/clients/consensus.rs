// ============================================
// File: crates/mobattest-client/src/clients/consensus.rs
// ============================================
//! Consensus client: submits transactions to an attested consensus node.

use tracing::debug;

use crate::api::consensus::{ProposeTxRequest, ProposeTxResponse};
use crate::api::paths;
use crate::error::Result;
use crate::services::connection::{AttestedConnection, ServiceDescriptor};

/// Consensus service description.
pub const CONSENSUS_SERVICE: ServiceDescriptor =
    ServiceDescriptor::new("consensus", paths::CONSENSUS_AUTH);

/// Attested consensus node client.
#[derive(Debug)]
pub struct ConsensusClient {
    connection: AttestedConnection,
}

impl ConsensusClient {
    /// Wraps a connection built for [`CONSENSUS_SERVICE`].
    #[must_use]
    pub const fn new(connection: AttestedConnection) -> Self {
        Self { connection }
    }

    /// Returns the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &AttestedConnection {
        &self.connection
    }

    /// Proposes a transaction.
    ///
    /// A rejection by consensus is not an error; inspect
    /// [`ProposeTxResponse::result`].
    ///
    /// # Errors
    /// See [`AttestedConnection::call`].
    pub async fn propose_tx(&self, request: &ProposeTxRequest) -> Result<ProposeTxResponse> {
        let response: ProposeTxResponse = self
            .connection
            .call(paths::CONSENSUS_PROPOSE_TX, &[], request)
            .await?;
        debug!(
            result = response.result,
            block_count = response.block_count,
            "Transaction proposal answered"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use prost::Message;

    use super::*;
    use crate::api::consensus::ProposeTxResult;
    use crate::testing::{FakeEnclave, FAKE_RESPONDER};
    use mobattest_common::ResponderId;
    use mobattest_core::testing;

    #[tokio::test]
    async fn test_propose_tx() {
        let enclave = FakeEnclave::new(paths::CONSENSUS_AUTH, testing::deadbeef(), |path, body| {
            assert_eq!(path, paths::CONSENSUS_PROPOSE_TX);
            let request = ProposeTxRequest::decode(body).unwrap();
            let result = if request.tx.is_empty() {
                ProposeTxResult::NoInputs
            } else {
                ProposeTxResult::Ok
            };
            ProposeTxResponse {
                result: result as i32,
                block_count: 100,
                block_version: 3,
                err_msg: String::new(),
            }
            .encode_to_vec()
        });
        let client = ConsensusClient::new(AttestedConnection::new(
            CONSENSUS_SERVICE,
            ResponderId::new(FAKE_RESPONDER).unwrap(),
            Arc::new(testing::verifier_for(testing::deadbeef())),
            Arc::new(enclave.transport()),
        ));

        let accepted = client
            .propose_tx(&ProposeTxRequest { tx: vec![1, 2, 3] })
            .await
            .unwrap();
        assert!(accepted.is_ok());
        assert_eq!(accepted.block_count, 100);

        let rejected = client.propose_tx(&ProposeTxRequest { tx: vec![] }).await.unwrap();
        assert_eq!(rejected.result, ProposeTxResult::NoInputs as i32);
        assert_eq!(enclave.handshakes(), 1);
    }
}
