// ============================================
// File: crates/mobattest-client/src/clients/fog_view.rs
// ============================================
//! Fog view client: looks up a user's TxOuts by search key.
//!
//! The query cursor travels as the envelope AAD, so the view server can
//! page without decrypting, and the enclave still authenticates it.

use prost::Message;

use crate::api::fog_view::{QueryRequest, QueryRequestAad, QueryResponse};
use crate::api::paths;
use crate::error::Result;
use crate::services::connection::{AttestedConnection, ServiceDescriptor};

/// Fog view service description.
pub const FOG_VIEW_SERVICE: ServiceDescriptor =
    ServiceDescriptor::new("fog_view", paths::FOG_VIEW_AUTH);

/// Attested fog view client.
#[derive(Debug)]
pub struct FogViewClient {
    connection: AttestedConnection,
}

impl FogViewClient {
    /// Wraps a connection built for [`FOG_VIEW_SERVICE`].
    #[must_use]
    pub const fn new(connection: AttestedConnection) -> Self {
        Self { connection }
    }

    /// Returns the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &AttestedConnection {
        &self.connection
    }

    /// Queries the view enclave.
    ///
    /// # Errors
    /// See [`AttestedConnection::call`].
    pub async fn query(
        &self,
        aad: &QueryRequestAad,
        request: &QueryRequest,
    ) -> Result<QueryResponse> {
        self.connection
            .call(paths::FOG_VIEW_QUERY, &aad.encode_to_vec(), request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::fog_view::TxOutSearchResult;
    use crate::testing::{FakeEnclave, FAKE_RESPONDER};
    use mobattest_common::ResponderId;
    use mobattest_core::testing;
    use mobattest_core::AttestedMessage;

    #[tokio::test]
    async fn test_query_sends_cursor_as_aad() {
        let enclave = FakeEnclave::new(paths::FOG_VIEW_AUTH, testing::deadbeef(), |_, body| {
            let request = QueryRequest::decode(body).unwrap();
            QueryResponse {
                highest_processed_block_count: 50,
                next_start_from_user_event_id: 8,
                tx_out_search_results: request
                    .get_txos
                    .into_iter()
                    .map(|search_key| TxOutSearchResult {
                        search_key,
                        result_code: 1,
                        ciphertext: vec![0xcc],
                    })
                    .collect(),
                ..Default::default()
            }
            .encode_to_vec()
        });
        let mock = Arc::new(enclave.transport());
        let client = FogViewClient::new(AttestedConnection::new(
            FOG_VIEW_SERVICE,
            ResponderId::new(FAKE_RESPONDER).unwrap(),
            Arc::new(testing::verifier_for(testing::deadbeef())),
            mock.clone(),
        ));

        let aad = QueryRequestAad {
            start_from_user_event_id: 7,
            start_from_block_index: 40,
        };
        let response = client
            .query(&aad, &QueryRequest { get_txos: vec![vec![1], vec![2]] })
            .await
            .unwrap();
        assert_eq!(response.next_start_from_user_event_id, 8);
        assert_eq!(response.tx_out_search_results.len(), 2);
        assert_eq!(response.tx_out_search_results[1].search_key, vec![2]);

        let sent = mock
            .calls()
            .into_iter()
            .find(|c| c.path == paths::FOG_VIEW_QUERY)
            .unwrap();
        let envelope = AttestedMessage::decode(sent.request.as_slice()).unwrap();
        assert_eq!(QueryRequestAad::decode(envelope.aad.as_slice()).unwrap(), aad);
    }
}
