//! Process-wide gateway: one-time backend initialization plus per-field and
//! batched encryption.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use super::{Ciphertext, DecryptionError, EncryptedField, EncryptionError, FheBackend, FheProvider};
use crate::domain::Address;

/// Encrypted bundle for a position's sensitive fields.
#[derive(Debug, Clone)]
pub struct EncryptedPositionData {
    pub amount: EncryptedField,
    pub shares: EncryptedField,
    pub entry_price: EncryptedField,
}

/// Encrypted bundle for portfolio summary fields.
#[derive(Debug, Clone)]
pub struct EncryptedPortfolioData {
    pub total_value: EncryptedField,
    pub total_pnl: EncryptedField,
    pub risk_exposure: EncryptedField,
    pub diversification_score: EncryptedField,
}

/// Encrypted bundle for vault-level metrics.
#[derive(Debug, Clone)]
pub struct EncryptedVaultMetrics {
    pub tvl: EncryptedField,
    pub total_shares: EncryptedField,
    pub performance: EncryptedField,
    pub risk_score: EncryptedField,
}

/// Gateway over the homomorphic-encryption backend.
///
/// The backend handle is created lazily on first use and shared for the
/// remainder of the process: concurrent first callers are serialized by the
/// initialization guard and all observe the same handle. There is no
/// teardown.
#[derive(Debug)]
pub struct FheGateway {
    provider: Arc<dyn FheProvider>,
    context: OnceCell<Arc<dyn FheBackend>>,
}

impl FheGateway {
    pub fn new(provider: Arc<dyn FheProvider>) -> Self {
        Self {
            provider,
            context: OnceCell::new(),
        }
    }

    /// Idempotent backend initialization.
    ///
    /// Exactly one `connect` happens even under concurrent first use; a
    /// failed attempt leaves the guard unset so a later call may retry.
    pub async fn initialize(&self) -> Result<Arc<dyn FheBackend>, EncryptionError> {
        self.context
            .get_or_try_init(|| async {
                debug!("initializing FHE backend");
                self.provider.connect().await
            })
            .await
            .map(Arc::clone)
    }

    /// Encrypt a single value and derive its proof for (contract, user).
    ///
    /// Either step failing fails the whole call; no partial result escapes.
    pub async fn encrypt_number(
        &self,
        value: i64,
        contract: &Address,
        user: &Address,
    ) -> Result<EncryptedField, EncryptionError> {
        let backend = self.initialize().await?;
        let ciphertext = backend.encrypt(value).await?;
        let proof = backend.prove(contract, user, &ciphertext).await?;
        Ok(EncryptedField { ciphertext, proof })
    }

    /// Decrypt a single ciphertext for an authorized (contract, user) pair.
    pub async fn decrypt_number(
        &self,
        ciphertext: &Ciphertext,
        contract: &Address,
        user: &Address,
    ) -> Result<i64, DecryptionError> {
        let backend = self
            .initialize()
            .await
            .map_err(|e| DecryptionError::Backend(e.to_string()))?;
        backend.decrypt(contract, user, ciphertext).await
    }

    /// Encrypt a position's {amount, shares, entry_price} concurrently.
    ///
    /// The three fields have no data dependency; they are dispatched
    /// together and joined. The first failure fails the batch and completed
    /// siblings are discarded.
    pub async fn encrypt_position_data(
        &self,
        amount: i64,
        shares: i64,
        entry_price: i64,
        contract: &Address,
        user: &Address,
    ) -> Result<EncryptedPositionData, EncryptionError> {
        let (amount, shares, entry_price) = tokio::try_join!(
            self.encrypt_number(amount, contract, user),
            self.encrypt_number(shares, contract, user),
            self.encrypt_number(entry_price, contract, user),
        )?;
        Ok(EncryptedPositionData {
            amount,
            shares,
            entry_price,
        })
    }

    /// Encrypt the four portfolio summary fields concurrently.
    pub async fn encrypt_portfolio_data(
        &self,
        total_value: i64,
        total_pnl: i64,
        risk_exposure: i64,
        diversification_score: i64,
        contract: &Address,
        user: &Address,
    ) -> Result<EncryptedPortfolioData, EncryptionError> {
        let (total_value, total_pnl, risk_exposure, diversification_score) = tokio::try_join!(
            self.encrypt_number(total_value, contract, user),
            self.encrypt_number(total_pnl, contract, user),
            self.encrypt_number(risk_exposure, contract, user),
            self.encrypt_number(diversification_score, contract, user),
        )?;
        Ok(EncryptedPortfolioData {
            total_value,
            total_pnl,
            risk_exposure,
            diversification_score,
        })
    }

    /// Encrypt vault-level metrics concurrently.
    pub async fn encrypt_vault_metrics(
        &self,
        tvl: i64,
        total_shares: i64,
        performance: i64,
        risk_score: i64,
        contract: &Address,
        user: &Address,
    ) -> Result<EncryptedVaultMetrics, EncryptionError> {
        let (tvl, total_shares, performance, risk_score) = tokio::try_join!(
            self.encrypt_number(tvl, contract, user),
            self.encrypt_number(total_shares, contract, user),
            self.encrypt_number(performance, contract, user),
            self.encrypt_number(risk_score, contract, user),
        )?;
        Ok(EncryptedVaultMetrics {
            tvl,
            total_shares,
            performance,
            risk_score,
        })
    }
}
