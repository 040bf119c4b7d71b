//! HTTP JSON-RPC transport to the ledger contract.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::transport::{
    ContractCall, ContractQuery, EncryptedPortfolioRecord, EncryptedPositionRecord,
    LedgerTransport, QueryResult, TransportError, TxHandle,
};
use crate::domain::{Address, PositionId};

/// Transport speaking a JSON envelope over HTTP to an RPC gateway fronting
/// the ledger contract. No retries or backoff; a transient failure is the
/// caller's to observe.
#[derive(Debug, Clone)]
pub struct RpcLedgerTransport {
    client: Client,
    base_url: String,
    contract: Address,
}

impl RpcLedgerTransport {
    pub fn new(base_url: String, contract: Address, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url,
            contract,
        }
    }

    async fn post(&self, path: &str, method: &str, body: Value) -> Result<Value, TransportError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(url = %url, method = method, contract = %self.contract, "ledger rpc call");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            // Contract-level rejection: the gateway forwards the revert
            // reason in the error body.
            let reason = response
                .json::<ErrorBody>()
                .await
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));
            return Err(TransportError::Rejected {
                method: method.to_string(),
                reason,
            });
        }
        if !status.is_success() {
            return Err(TransportError::Rpc {
                status: status.as_u16(),
                message: "server error".to_string(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::Protocol(e.to_string()))
    }

    fn envelope(&self, payload: &impl serde::Serialize) -> Result<Value, TransportError> {
        let mut value =
            serde_json::to_value(payload).map_err(|e| TransportError::Protocol(e.to_string()))?;
        value["contract"] = Value::String(self.contract.as_str().to_string());
        Ok(value)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    tx_hash: String,
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, TransportError> {
    serde_json::from_value(value).map_err(|e| TransportError::Protocol(e.to_string()))
}

#[async_trait]
impl LedgerTransport for RpcLedgerTransport {
    async fn submit(&self, call: ContractCall) -> Result<TxHandle, TransportError> {
        let method = call.method();
        let body = self.envelope(&call)?;
        let response = self.post("submit", method, body).await?;
        let submit: SubmitResponse = decode(response)?;
        Ok(TxHandle(submit.tx_hash))
    }

    async fn query(&self, query: ContractQuery) -> Result<QueryResult, TransportError> {
        let method = query.method();
        let body = self.envelope(&query)?;
        let mut response = self.post("query", method, body).await?;
        let result = response
            .get_mut("result")
            .map(Value::take)
            .ok_or_else(|| TransportError::Protocol("missing result field".to_string()))?;

        match query {
            ContractQuery::PositionData { .. } => {
                let record: EncryptedPositionRecord = decode(result)?;
                Ok(QueryResult::PositionData(record))
            }
            ContractQuery::PortfolioData { .. } => {
                let record: EncryptedPortfolioRecord = decode(result)?;
                Ok(QueryResult::PortfolioData(record))
            }
            ContractQuery::PositionCount { .. } => {
                let count: u64 = decode(result)?;
                Ok(QueryResult::PositionCount(count))
            }
            ContractQuery::PositionIds { .. } => {
                let ids: Vec<u64> = decode(result)?;
                Ok(QueryResult::PositionIds(
                    ids.into_iter().map(PositionId::new).collect(),
                ))
            }
        }
    }
}
