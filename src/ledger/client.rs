//! Vault client: composes the calculators, the encryption gateway and the
//! ledger transport, and owns user-facing error mapping.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, error, warn};

use super::transport::{
    ContractCall, ContractQuery, EncryptedPortfolioRecord, EncryptedPositionRecord,
    LedgerTransport, QueryResult, TransportError, TxHandle,
};
use crate::domain::{Address, PortfolioSummary, Position, PositionId};
use crate::error::VaultError;
use crate::fhe::FheGateway;
use crate::metrics::calculate_portfolio_metrics;
use crate::wallet::WalletSession;

/// Client for the confidential vault contract.
///
/// Plaintext metrics are computed locally, sensitive fields are encrypted
/// through the gateway, and the resulting ciphertext bundles are submitted
/// over the transport. Every write checks wallet presence synchronously
/// before any async work.
#[derive(Debug)]
pub struct VaultClient {
    gateway: Arc<FheGateway>,
    transport: Arc<dyn LedgerTransport>,
    wallet: Arc<dyn WalletSession>,
    contract: Address,
}

impl VaultClient {
    pub fn new(
        gateway: Arc<FheGateway>,
        transport: Arc<dyn LedgerTransport>,
        wallet: Arc<dyn WalletSession>,
        contract: Address,
    ) -> Self {
        Self {
            gateway,
            transport,
            wallet,
            contract,
        }
    }

    /// Contract address this client targets.
    pub fn contract(&self) -> &Address {
        &self.contract
    }

    fn require_wallet(&self) -> Result<Address, VaultError> {
        self.wallet.address().ok_or(VaultError::NoWallet)
    }

    async fn submit(&self, call: ContractCall) -> Result<TxHandle, VaultError> {
        let method = call.method();
        let tx = self.transport.submit(call).await.map_err(|e| {
            error!(method = method, error = %e, "ledger submission failed");
            VaultError::from(e)
        })?;
        debug!(method = method, tx = %tx, "ledger submission accepted");
        Ok(tx)
    }

    async fn query(&self, query: ContractQuery) -> Result<QueryResult, VaultError> {
        let method = query.method();
        self.transport.query(query).await.map_err(|e| {
            warn!(method = method, error = %e, "ledger query failed");
            VaultError::from(e)
        })
    }

    /// Create a position from plaintext business inputs.
    ///
    /// Encrypts {amount, shares, entry_price} as one batch and submits the
    /// three ciphertexts with the amount field's proof.
    pub async fn create_position(
        &self,
        amount: f64,
        shares: f64,
        entry_price: f64,
    ) -> Result<TxHandle, VaultError> {
        let user = self.require_wallet()?;
        debug!(user = %user, "creating position");

        let encrypted = self
            .gateway
            .encrypt_position_data(
                amount.round() as i64,
                shares.round() as i64,
                entry_price.round() as i64,
                &self.contract,
                &user,
            )
            .await
            .map_err(|e| {
                error!(error = %e, "position encryption failed");
                VaultError::from(e)
            })?;

        self.submit(ContractCall::CreatePosition {
            proof: encrypted.amount.proof.clone(),
            amount: encrypted.amount.ciphertext,
            shares: encrypted.shares.ciphertext,
            entry_price: encrypted.entry_price.ciphertext,
        })
        .await
    }

    /// Update an existing position's amount and shares.
    ///
    /// The entry price slot is encrypted as a placeholder zero but never
    /// transmitted; an update cannot rewrite the entry price.
    pub async fn update_position(
        &self,
        id: PositionId,
        new_amount: f64,
        new_shares: f64,
    ) -> Result<TxHandle, VaultError> {
        let user = self.require_wallet()?;
        debug!(user = %user, position = %id, "updating position");

        let encrypted = self
            .gateway
            .encrypt_position_data(
                new_amount.round() as i64,
                new_shares.round() as i64,
                0,
                &self.contract,
                &user,
            )
            .await
            .map_err(|e| {
                error!(error = %e, "position encryption failed");
                VaultError::from(e)
            })?;

        self.submit(ContractCall::UpdatePosition {
            position_id: id,
            proof: encrypted.amount.proof.clone(),
            new_amount: encrypted.amount.ciphertext,
            new_shares: encrypted.shares.ciphertext,
        })
        .await
    }

    /// Submit updated portfolio summary fields.
    pub async fn update_portfolio_metrics(
        &self,
        total_value: i64,
        total_pnl: i64,
        risk_exposure: u8,
        diversification_score: u8,
    ) -> Result<TxHandle, VaultError> {
        let user = self.require_wallet()?;
        debug!(user = %user, "updating portfolio metrics");

        let encrypted = self
            .gateway
            .encrypt_portfolio_data(
                total_value,
                total_pnl,
                i64::from(risk_exposure),
                i64::from(diversification_score),
                &self.contract,
                &user,
            )
            .await
            .map_err(|e| {
                error!(error = %e, "portfolio encryption failed");
                VaultError::from(e)
            })?;

        self.submit(ContractCall::UpdatePortfolioMetrics {
            proof: encrypted.total_value.proof.clone(),
            total_value: encrypted.total_value.ciphertext,
            total_pnl: encrypted.total_pnl.ciphertext,
            risk_exposure: encrypted.risk_exposure.ciphertext,
            diversification_score: encrypted.diversification_score.ciphertext,
        })
        .await
    }

    /// Aggregate local positions and submit the resulting summary.
    pub async fn submit_portfolio_summary(
        &self,
        positions: &[Position],
    ) -> Result<(PortfolioSummary, TxHandle), VaultError> {
        let metrics: Vec<_> = positions.iter().map(|p| p.metrics).collect();
        let summary = calculate_portfolio_metrics(&metrics);
        let tx = self
            .update_portfolio_metrics(
                summary.total_value,
                summary.total_pnl,
                summary.risk_exposure,
                summary.diversification_score,
            )
            .await?;
        Ok((summary, tx))
    }

    /// Trigger ledger-side analytics computation. No plaintext payload.
    pub async fn request_analytics(&self) -> Result<TxHandle, VaultError> {
        self.require_wallet()?;
        self.submit(ContractCall::RequestAnalytics).await
    }

    /// Request the ledger null out all of the user's encrypted state.
    /// Idempotent beyond transaction cost.
    pub async fn clear_private_data(&self) -> Result<TxHandle, VaultError> {
        self.require_wallet()?;
        self.submit(ContractCall::ClearPrivateData).await
    }

    /// Request the ledger null out one position's encrypted state.
    /// Idempotent beyond transaction cost.
    pub async fn clear_position_data(&self, id: PositionId) -> Result<TxHandle, VaultError> {
        self.require_wallet()?;
        self.submit(ContractCall::ClearPositionData { position_id: id })
            .await
    }

    /// Number of positions the ledger holds for the current user.
    ///
    /// Without a connected wallet the query is skipped and 0 is returned.
    pub async fn get_user_position_count(&self) -> Result<u64, VaultError> {
        let Some(user) = self.wallet.address() else {
            debug!("no wallet connected, skipping position count query");
            return Ok(0);
        };
        match self.query(ContractQuery::PositionCount { user }).await? {
            QueryResult::PositionCount(count) => Ok(count),
            other => Err(unexpected_result("getUserPositionCount", &other)),
        }
    }

    /// Ids of the current user's positions.
    ///
    /// Without a connected wallet the query is skipped and an empty list is
    /// returned.
    pub async fn get_user_position_ids(&self) -> Result<Vec<PositionId>, VaultError> {
        let Some(user) = self.wallet.address() else {
            debug!("no wallet connected, skipping position ids query");
            return Ok(Vec::new());
        };
        match self.query(ContractQuery::PositionIds { user }).await? {
            QueryResult::PositionIds(ids) => Ok(ids),
            other => Err(unexpected_result("getUserPositionIds", &other)),
        }
    }

    /// Fetch one position's encrypted record.
    pub async fn get_position_data(
        &self,
        id: PositionId,
    ) -> Result<EncryptedPositionRecord, VaultError> {
        match self
            .query(ContractQuery::PositionData { position_id: id })
            .await?
        {
            QueryResult::PositionData(record) => Ok(record),
            other => Err(unexpected_result("getPositionData", &other)),
        }
    }

    /// Fetch the current user's encrypted portfolio record.
    pub async fn get_portfolio_data(&self) -> Result<EncryptedPortfolioRecord, VaultError> {
        let user = self.require_wallet()?;
        match self.query(ContractQuery::PortfolioData { user }).await? {
            QueryResult::PortfolioData(record) => Ok(record),
            other => Err(unexpected_result("getPortfolioData", &other)),
        }
    }

    /// Fetch encrypted records for all of the user's positions, fanned out
    /// concurrently.
    pub async fn get_all_position_data(
        &self,
    ) -> Result<Vec<(PositionId, EncryptedPositionRecord)>, VaultError> {
        let ids = self.get_user_position_ids().await?;
        try_join_all(ids.into_iter().map(|id| async move {
            let record = self.get_position_data(id).await?;
            Ok::<_, VaultError>((id, record))
        }))
        .await
    }

    /// Decrypt the user's portfolio record back to a plaintext summary.
    pub async fn decrypt_portfolio_data(
        &self,
        record: &EncryptedPortfolioRecord,
    ) -> Result<PortfolioSummary, VaultError> {
        let user = self.require_wallet()?;
        let contract = &self.contract;

        let (total_value, total_pnl, risk_exposure, diversification_score, is_private) = tokio::try_join!(
            self.gateway
                .decrypt_number(&record.total_value, contract, &user),
            self.gateway
                .decrypt_number(&record.total_pnl, contract, &user),
            self.gateway
                .decrypt_number(&record.risk_exposure, contract, &user),
            self.gateway
                .decrypt_number(&record.diversification_score, contract, &user),
            self.gateway
                .decrypt_number(&record.is_private, contract, &user),
        )
        .map_err(|e| {
            error!(error = %e, "portfolio decryption failed");
            VaultError::from(e)
        })?;

        Ok(PortfolioSummary {
            total_value,
            total_pnl,
            risk_exposure: risk_exposure.clamp(0, 80) as u8,
            diversification_score: diversification_score.clamp(0, 100) as u8,
            is_private: is_private != 0,
        })
    }
}

fn unexpected_result(method: &str, got: &QueryResult) -> VaultError {
    warn!(method = method, "mismatched query result variant");
    VaultError::from(TransportError::Protocol(format!(
        "unexpected result variant for {}: {:?}",
        method, got
    )))
}
