//! Encryption gateway over a homomorphic-encryption backend.
//!
//! The cryptosystem itself is an opaque collaborator reached through the
//! narrow [`FheBackend`] trait. [`FheGateway`] owns the lazily-initialized
//! process-wide backend handle and exposes per-field and batched encryption,
//! each encryption paired with a validity proof scoped to a
//! (contract, user) context.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::domain::Address;

pub mod gateway;
pub mod mock;
pub mod relayer;

pub use gateway::{
    EncryptedPortfolioData, EncryptedPositionData, EncryptedVaultMetrics, FheGateway,
};
pub use mock::{MockFheBackend, MockFheProvider};
pub use relayer::{RelayerBackend, RelayerFheProvider};

/// Opaque ciphertext bytes produced by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ciphertext(pub Vec<u8>);

impl Ciphertext {
    pub fn new(bytes: Vec<u8>) -> Self {
        Ciphertext(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Render as 0x-prefixed hex, the ledger's wire encoding.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }

    /// Parse from 0x-prefixed hex.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        Ok(Ciphertext(hex::decode(stripped)?))
    }
}

impl Serialize for Ciphertext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ciphertext {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ciphertext::from_hex(&s).map_err(D::Error::custom)
    }
}

/// Opaque validity proof bound to the (contract, user) context it was
/// generated for. Reuse across a different pair is rejected by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Proof(pub Vec<u8>);

impl Proof {
    pub fn new(bytes: Vec<u8>) -> Self {
        Proof(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Render as 0x-prefixed hex, the ledger's wire encoding.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }

    /// Parse from 0x-prefixed hex.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        Ok(Proof(hex::decode(stripped)?))
    }
}

impl Serialize for Proof {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Proof {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Proof::from_hex(&s).map_err(D::Error::custom)
    }
}

/// A ciphertext paired with its validity proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedField {
    pub ciphertext: Ciphertext,
    pub proof: Proof,
}

/// Error type for backend construction and encryption.
#[derive(Debug, Clone, Error)]
pub enum EncryptionError {
    /// The backend handle could not be constructed (e.g. key material
    /// unavailable).
    #[error("FHE backend unavailable: {0}")]
    Backend(String),
    /// A per-field encryption failed.
    #[error("encryption failed: {0}")]
    Encrypt(String),
    /// Proof generation failed after a successful encryption.
    #[error("proof generation failed: {0}")]
    Proof(String),
}

/// Error type for the decryption path.
#[derive(Debug, Clone, Error)]
pub enum DecryptionError {
    /// The backend handle could not be constructed.
    #[error("FHE backend unavailable: {0}")]
    Backend(String),
    /// The caller is not authorized to decrypt for this context.
    #[error("unauthorized decryption for contract {contract}, user {user}")]
    Unauthorized { contract: Address, user: Address },
    /// The ciphertext could not be parsed or failed integrity checks.
    #[error("malformed ciphertext: {0}")]
    Malformed(String),
    /// Any other backend-reported decryption failure.
    #[error("decryption failed: {0}")]
    Other(String),
}

/// Narrow interface to the homomorphic-encryption backend.
///
/// Implementations hold whatever key material the cryptosystem needs and are
/// shared process-wide behind the gateway's one-time initialization guard.
#[async_trait]
pub trait FheBackend: Send + Sync + fmt::Debug {
    /// Encrypt a single signed integer plaintext.
    async fn encrypt(&self, value: i64) -> Result<Ciphertext, EncryptionError>;

    /// Derive a validity proof for a ciphertext, bound to the given
    /// (contract, user) context.
    async fn prove(
        &self,
        contract: &Address,
        user: &Address,
        ciphertext: &Ciphertext,
    ) -> Result<Proof, EncryptionError>;

    /// Decrypt a ciphertext for an authorized (contract, user) context.
    async fn decrypt(
        &self,
        contract: &Address,
        user: &Address,
        ciphertext: &Ciphertext,
    ) -> Result<i64, DecryptionError>;
}

/// Factory for the backend handle, invoked exactly once per process by the
/// gateway's initialization guard.
#[async_trait]
pub trait FheProvider: Send + Sync + fmt::Debug {
    /// Construct the backend (fetching key material as needed).
    async fn connect(&self) -> Result<Arc<dyn FheBackend>, EncryptionError>;
}
