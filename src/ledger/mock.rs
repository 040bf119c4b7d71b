//! Mock ledger transport for testing without network calls.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::transport::{
    ContractCall, ContractQuery, EncryptedPortfolioRecord, EncryptedPositionRecord,
    LedgerTransport, QueryResult, TransportError, TxHandle,
};
use crate::domain::PositionId;

/// Mock transport recording every call and serving canned query results.
///
/// Position ids are handed out sequentially on `createPosition`, mirroring
/// ledger-side allocation. Writes against a cleared position are rejected
/// the way the contract would reject them.
#[derive(Debug, Default)]
pub struct MockLedgerTransport {
    calls: Mutex<Vec<ContractCall>>,
    queries: Mutex<Vec<ContractQuery>>,
    next_position_id: AtomicU64,
    cleared: Mutex<HashSet<PositionId>>,
    position_count: Mutex<Option<u64>>,
    position_ids: Mutex<Vec<PositionId>>,
    position_record: Mutex<Option<EncryptedPositionRecord>>,
    portfolio_record: Mutex<Option<EncryptedPortfolioRecord>>,
    fail_all: Mutex<Option<String>>,
}

impl MockLedgerTransport {
    pub fn new() -> Self {
        Self {
            next_position_id: AtomicU64::new(1),
            ..Default::default()
        }
    }

    /// Canned result for `getUserPositionCount`.
    pub fn with_position_count(self, count: u64) -> Self {
        *self.position_count.lock().unwrap() = Some(count);
        self
    }

    /// Canned result for `getUserPositionIds`.
    pub fn with_position_ids(self, ids: Vec<PositionId>) -> Self {
        *self.position_ids.lock().unwrap() = ids;
        self
    }

    /// Canned result for `getPositionData`.
    pub fn with_position_record(self, record: EncryptedPositionRecord) -> Self {
        *self.position_record.lock().unwrap() = Some(record);
        self
    }

    /// Canned result for `getPortfolioData`.
    pub fn with_portfolio_record(self, record: EncryptedPortfolioRecord) -> Self {
        *self.portfolio_record.lock().unwrap() = Some(record);
        self
    }

    /// Mark a position as cleared so later writes against it are rejected.
    pub fn with_cleared_position(self, id: PositionId) -> Self {
        self.cleared.lock().unwrap().insert(id);
        self
    }

    /// Fail every submission and query with a network error.
    pub fn with_network_failure(self, message: &str) -> Self {
        *self.fail_all.lock().unwrap() = Some(message.to_string());
        self
    }

    /// Total transport round trips attempted (submissions plus queries).
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len() + self.queries.lock().unwrap().len()
    }

    /// Snapshot of submitted contract calls, in order.
    pub fn submitted(&self) -> Vec<ContractCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Snapshot of executed queries, in order.
    pub fn queried(&self) -> Vec<ContractQuery> {
        self.queries.lock().unwrap().clone()
    }

    fn check_failure(&self) -> Result<(), TransportError> {
        if let Some(msg) = self.fail_all.lock().unwrap().as_ref() {
            return Err(TransportError::Network(msg.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerTransport for MockLedgerTransport {
    async fn submit(&self, call: ContractCall) -> Result<TxHandle, TransportError> {
        self.check_failure()?;
        self.calls.lock().unwrap().push(call.clone());

        match &call {
            ContractCall::CreatePosition { .. } => {
                let id = self.next_position_id.fetch_add(1, Ordering::SeqCst);
                Ok(TxHandle(format!("0xtx-create-{}", id)))
            }
            ContractCall::UpdatePosition { position_id, .. } => {
                if self.cleared.lock().unwrap().contains(position_id) {
                    return Err(TransportError::Rejected {
                        method: call.method().to_string(),
                        reason: format!("position {} cleared", position_id),
                    });
                }
                Ok(TxHandle(format!("0xtx-update-{}", position_id)))
            }
            ContractCall::ClearPositionData { position_id } => {
                // Idempotent: clearing twice is a no-op beyond the call.
                self.cleared.lock().unwrap().insert(*position_id);
                Ok(TxHandle(format!("0xtx-clear-{}", position_id)))
            }
            ContractCall::UpdatePortfolioMetrics { .. }
            | ContractCall::RequestAnalytics
            | ContractCall::ClearPrivateData => {
                Ok(TxHandle(format!("0xtx-{}", call.method())))
            }
        }
    }

    async fn query(&self, query: ContractQuery) -> Result<QueryResult, TransportError> {
        self.check_failure()?;
        self.queries.lock().unwrap().push(query.clone());

        match query {
            ContractQuery::PositionData { position_id } => self
                .position_record
                .lock()
                .unwrap()
                .clone()
                .map(QueryResult::PositionData)
                .ok_or_else(|| TransportError::Rejected {
                    method: "getPositionData".to_string(),
                    reason: format!("unknown position {}", position_id),
                }),
            ContractQuery::PortfolioData { user } => self
                .portfolio_record
                .lock()
                .unwrap()
                .clone()
                .map(QueryResult::PortfolioData)
                .ok_or_else(|| TransportError::Rejected {
                    method: "getPortfolioData".to_string(),
                    reason: format!("no portfolio for {}", user),
                }),
            ContractQuery::PositionCount { .. } => Ok(QueryResult::PositionCount(
                self.position_count.lock().unwrap().unwrap_or(0),
            )),
            ContractQuery::PositionIds { .. } => Ok(QueryResult::PositionIds(
                self.position_ids.lock().unwrap().clone(),
            )),
        }
    }
}
