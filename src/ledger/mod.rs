//! Ledger integration: transport abstraction, HTTP RPC implementation, mock
//! transport, and the orchestrating vault client.

pub mod client;
pub mod mock;
pub mod rpc;
pub mod transport;

pub use client::VaultClient;
pub use mock::MockLedgerTransport;
pub use rpc::RpcLedgerTransport;
pub use transport::{
    ContractCall, ContractQuery, EncryptedPortfolioRecord, EncryptedPositionRecord,
    LedgerTransport, QueryResult, TransportError, TxHandle,
};
