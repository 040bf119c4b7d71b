//! FHE relayer backend: reaches the cryptosystem over its HTTP relayer
//! service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{
    Ciphertext, DecryptionError, EncryptionError, FheBackend, FheProvider, Proof,
};
use crate::domain::Address;

/// Provider that checks the relayer is reachable and keyed before handing
/// out a backend.
#[derive(Debug, Clone)]
pub struct RelayerFheProvider {
    client: Client,
    base_url: String,
}

impl RelayerFheProvider {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, base_url }
    }
}

#[derive(Deserialize)]
struct StatusResponse {
    ready: bool,
}

#[derive(Deserialize)]
struct EncryptResponse {
    ciphertext: String,
}

#[derive(Deserialize)]
struct ProofResponse {
    proof: String,
}

#[derive(Deserialize)]
struct DecryptResponse {
    value: i64,
}

#[async_trait]
impl FheProvider for RelayerFheProvider {
    async fn connect(&self) -> Result<Arc<dyn FheBackend>, EncryptionError> {
        let url = format!("{}/v1/status", self.base_url);
        debug!(url = %url, "checking FHE relayer status");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| EncryptionError::Backend(e.to_string()))?;
        if !response.status().is_success() {
            return Err(EncryptionError::Backend(format!(
                "relayer status returned HTTP {}",
                response.status().as_u16()
            )));
        }
        let status: StatusResponse = response
            .json()
            .await
            .map_err(|e| EncryptionError::Backend(e.to_string()))?;
        if !status.ready {
            return Err(EncryptionError::Backend(
                "relayer key material not ready".to_string(),
            ));
        }

        Ok(Arc::new(RelayerBackend {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
        }))
    }
}

/// Backend handle speaking the relayer's JSON protocol. One blocking round
/// trip per operation; no retries, transient failures surface directly.
#[derive(Debug, Clone)]
pub struct RelayerBackend {
    client: Client,
    base_url: String,
}

#[async_trait]
impl FheBackend for RelayerBackend {
    async fn encrypt(&self, value: i64) -> Result<Ciphertext, EncryptionError> {
        let url = format!("{}/v1/encrypt", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "value": value }))
            .send()
            .await
            .map_err(|e| EncryptionError::Encrypt(e.to_string()))?;
        if !response.status().is_success() {
            return Err(EncryptionError::Encrypt(format!(
                "relayer returned HTTP {}",
                response.status().as_u16()
            )));
        }
        let body: EncryptResponse = response
            .json()
            .await
            .map_err(|e| EncryptionError::Encrypt(e.to_string()))?;
        Ciphertext::from_hex(&body.ciphertext)
            .map_err(|e| EncryptionError::Encrypt(format!("bad ciphertext hex: {}", e)))
    }

    async fn prove(
        &self,
        contract: &Address,
        user: &Address,
        ciphertext: &Ciphertext,
    ) -> Result<Proof, EncryptionError> {
        let url = format!("{}/v1/input-proof", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "contract": contract.as_str(),
                "user": user.as_str(),
                "ciphertext": ciphertext.to_hex(),
            }))
            .send()
            .await
            .map_err(|e| EncryptionError::Proof(e.to_string()))?;
        if !response.status().is_success() {
            return Err(EncryptionError::Proof(format!(
                "relayer returned HTTP {}",
                response.status().as_u16()
            )));
        }
        let body: ProofResponse = response
            .json()
            .await
            .map_err(|e| EncryptionError::Proof(e.to_string()))?;
        Proof::from_hex(&body.proof)
            .map_err(|e| EncryptionError::Proof(format!("bad proof hex: {}", e)))
    }

    async fn decrypt(
        &self,
        contract: &Address,
        user: &Address,
        ciphertext: &Ciphertext,
    ) -> Result<i64, DecryptionError> {
        let url = format!("{}/v1/decrypt", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "contract": contract.as_str(),
                "user": user.as_str(),
                "ciphertext": ciphertext.to_hex(),
            }))
            .send()
            .await
            .map_err(|e| DecryptionError::Other(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(DecryptionError::Unauthorized {
                contract: contract.clone(),
                user: user.clone(),
            });
        }
        if status.as_u16() == 400 || status.as_u16() == 422 {
            return Err(DecryptionError::Malformed(format!(
                "relayer rejected ciphertext with HTTP {}",
                status.as_u16()
            )));
        }
        if !status.is_success() {
            return Err(DecryptionError::Other(format!(
                "relayer returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: DecryptResponse = response
            .json()
            .await
            .map_err(|e| DecryptionError::Other(e.to_string()))?;
        Ok(body.value)
    }
}
