use thiserror::Error;

use crate::fhe::{DecryptionError, EncryptionError};
use crate::ledger::transport::TransportError;

/// Top-level error taxonomy for vault client operations.
///
/// `NoWallet` is raised synchronously before any network work. Everything
/// else is logged where it occurs and propagated unmodified; the client
/// never substitutes a default for a failed encryption or transaction.
#[derive(Debug, Clone, Error)]
pub enum VaultError {
    /// A write required an authenticated session and none was present.
    #[error("no wallet connected")]
    NoWallet,
    /// Backend construction or per-field encryption failed.
    #[error(transparent)]
    Encryption(#[from] EncryptionError),
    /// Unauthorized or malformed ciphertext on the read path.
    #[error(transparent)]
    Decryption(#[from] DecryptionError),
    /// Network failure or contract-level rejection.
    #[error(transparent)]
    Transaction(#[from] TransportError),
}
