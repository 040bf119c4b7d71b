//! Ledger transport abstraction: the contract's byte-level calling surface.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Address, PositionId};
use crate::fhe::{Ciphertext, Proof};

/// Handle for a submitted transaction (hash string from the ledger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHandle(pub String);

impl TxHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State-changing contract calls. Each submission carries ciphertexts plus a
/// single validity proof for the bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "args", rename_all = "camelCase")]
pub enum ContractCall {
    #[serde(rename_all = "camelCase")]
    CreatePosition {
        amount: Ciphertext,
        shares: Ciphertext,
        entry_price: Ciphertext,
        proof: Proof,
    },
    #[serde(rename_all = "camelCase")]
    UpdatePosition {
        position_id: PositionId,
        new_amount: Ciphertext,
        new_shares: Ciphertext,
        proof: Proof,
    },
    #[serde(rename_all = "camelCase")]
    UpdatePortfolioMetrics {
        total_value: Ciphertext,
        total_pnl: Ciphertext,
        risk_exposure: Ciphertext,
        diversification_score: Ciphertext,
        proof: Proof,
    },
    RequestAnalytics,
    ClearPrivateData,
    #[serde(rename_all = "camelCase")]
    ClearPositionData { position_id: PositionId },
}

impl ContractCall {
    /// Contract method name, for logging and the wire envelope.
    pub fn method(&self) -> &'static str {
        match self {
            ContractCall::CreatePosition { .. } => "createPosition",
            ContractCall::UpdatePosition { .. } => "updatePosition",
            ContractCall::UpdatePortfolioMetrics { .. } => "updatePortfolioMetrics",
            ContractCall::RequestAnalytics => "requestAnalytics",
            ContractCall::ClearPrivateData => "clearPrivateData",
            ContractCall::ClearPositionData { .. } => "clearPositionData",
        }
    }
}

/// Read-only contract queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "args")]
pub enum ContractQuery {
    #[serde(rename = "getPositionData", rename_all = "camelCase")]
    PositionData { position_id: PositionId },
    #[serde(rename = "getPortfolioData")]
    PortfolioData { user: Address },
    #[serde(rename = "getUserPositionCount")]
    PositionCount { user: Address },
    #[serde(rename = "getUserPositionIds")]
    PositionIds { user: Address },
}

impl ContractQuery {
    /// Contract method name, for logging and the wire envelope.
    pub fn method(&self) -> &'static str {
        match self {
            ContractQuery::PositionData { .. } => "getPositionData",
            ContractQuery::PortfolioData { .. } => "getPortfolioData",
            ContractQuery::PositionCount { .. } => "getUserPositionCount",
            ContractQuery::PositionIds { .. } => "getUserPositionIds",
        }
    }
}

/// Encrypted per-position state as stored on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedPositionRecord {
    pub amount: Ciphertext,
    pub shares: Ciphertext,
    pub entry_price: Ciphertext,
    pub current_price: Ciphertext,
    pub is_active: Ciphertext,
}

/// Encrypted portfolio state as stored on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedPortfolioRecord {
    pub total_value: Ciphertext,
    pub total_pnl: Ciphertext,
    pub risk_exposure: Ciphertext,
    pub diversification_score: Ciphertext,
    pub is_private: Ciphertext,
}

/// Typed query results, one variant per query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    PositionData(EncryptedPositionRecord),
    PortfolioData(EncryptedPortfolioRecord),
    PositionCount(u64),
    PositionIds(Vec<PositionId>),
}

/// Error type for transport operations.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network failure (connection refused, timeout, DNS).
    #[error("network error: {0}")]
    Network(String),
    /// The contract rejected the call.
    #[error("contract rejected {method}: {reason}")]
    Rejected { method: String, reason: String },
    /// Unexpected HTTP status from the RPC endpoint.
    #[error("rpc error {status}: {message}")]
    Rpc { status: u16, message: String },
    /// Malformed or mismatched response payload.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Transport to the ledger contract.
///
/// One blocking round trip per call; implementations issue no automatic
/// retries, so transient failures surface directly to the caller.
#[async_trait]
pub trait LedgerTransport: Send + Sync + fmt::Debug {
    /// Submit a state-changing call, returning its transaction handle.
    async fn submit(&self, call: ContractCall) -> Result<TxHandle, TransportError>;

    /// Execute a read-only query.
    async fn query(&self, query: ContractQuery) -> Result<QueryResult, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names_match_contract_surface() {
        assert_eq!(ContractCall::RequestAnalytics.method(), "requestAnalytics");
        assert_eq!(ContractCall::ClearPrivateData.method(), "clearPrivateData");
        assert_eq!(
            ContractCall::ClearPositionData {
                position_id: PositionId::new(1)
            }
            .method(),
            "clearPositionData"
        );
        assert_eq!(
            ContractQuery::PositionCount {
                user: Address::new("0xu".to_string())
            }
            .method(),
            "getUserPositionCount"
        );
    }

    #[test]
    fn test_call_serializes_ciphertexts_as_hex() {
        let call = ContractCall::UpdatePosition {
            position_id: PositionId::new(7),
            new_amount: Ciphertext::new(vec![0xaa]),
            new_shares: Ciphertext::new(vec![0xbb]),
            proof: Proof::new(vec![0xcc]),
        };
        let json = serde_json::to_value(&call).unwrap();
        assert_eq!(json["method"], "updatePosition");
        assert_eq!(json["args"]["positionId"], 7);
        assert_eq!(json["args"]["newAmount"], "0xaa");
        assert_eq!(json["args"]["proof"], "0xcc");
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::Rejected {
            method: "updatePosition".to_string(),
            reason: "position cleared".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "contract rejected updatePosition: position cleared"
        );
    }
}
