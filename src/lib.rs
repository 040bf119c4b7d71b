pub mod config;
pub mod domain;
pub mod error;
pub mod fhe;
pub mod ledger;
pub mod metrics;
pub mod wallet;

pub use config::Config;
pub use domain::{Address, PortfolioSummary, Position, PositionId, PositionInput, PositionMetrics, TimeMs};
pub use error::VaultError;
pub use fhe::{
    Ciphertext, DecryptionError, EncryptedField, EncryptionError, FheBackend, FheGateway,
    FheProvider, MockFheBackend, MockFheProvider, Proof, RelayerFheProvider,
};
pub use ledger::{
    ContractCall, ContractQuery, LedgerTransport, MockLedgerTransport, QueryResult,
    RpcLedgerTransport, TransportError, TxHandle, VaultClient,
};
pub use metrics::{calculate_portfolio_metrics, calculate_position_metrics};
pub use wallet::{StaticWallet, WalletSession};
