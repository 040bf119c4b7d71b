//! Mock FHE backend for testing without a real cryptosystem.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::{
    Ciphertext, DecryptionError, EncryptionError, FheBackend, FheProvider, Proof,
};
use crate::domain::Address;

const MOCK_MAGIC: &[u8; 4] = b"svc1";
const TAG_LEN: usize = 16;

/// Deterministic mock backend.
///
/// Ciphertexts embed the plaintext plus a keyed integrity tag, so
/// round-tripping is exact and tampered bytes are detected as malformed.
/// Decryption authorization is an explicit allow-list of (contract, user)
/// pairs; an empty builder allows every pair.
#[derive(Debug, Clone, Default)]
pub struct MockFheBackend {
    key: Vec<u8>,
    acl: Option<Vec<(Address, Address)>>,
    failing_values: Vec<i64>,
}

impl MockFheBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a distinct integrity key (ciphertexts from differently-keyed
    /// backends are mutually malformed).
    pub fn with_key(mut self, key: &[u8]) -> Self {
        self.key = key.to_vec();
        self
    }

    /// Restrict decryption to the listed (contract, user) pairs.
    pub fn with_authorized(mut self, contract: Address, user: Address) -> Self {
        self.acl.get_or_insert_with(Vec::new).push((contract, user));
        self
    }

    /// Inject an encryption failure for one exact plaintext value.
    pub fn with_encrypt_failure(mut self, value: i64) -> Self {
        self.failing_values.push(value);
        self
    }

    fn tag(&self, plaintext_be: &[u8]) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(&self.key);
        hasher.update(plaintext_be);
        hasher.finalize()[..TAG_LEN].to_vec()
    }

    fn authorized(&self, contract: &Address, user: &Address) -> bool {
        match &self.acl {
            None => true,
            Some(pairs) => pairs.iter().any(|(c, u)| c == contract && u == user),
        }
    }
}

#[async_trait]
impl FheBackend for MockFheBackend {
    async fn encrypt(&self, value: i64) -> Result<Ciphertext, EncryptionError> {
        if self.failing_values.contains(&value) {
            return Err(EncryptionError::Encrypt(format!(
                "injected failure for value {}",
                value
            )));
        }
        let plaintext_be = value.to_be_bytes();
        let mut bytes = Vec::with_capacity(MOCK_MAGIC.len() + 8 + TAG_LEN);
        bytes.extend_from_slice(MOCK_MAGIC);
        bytes.extend_from_slice(&plaintext_be);
        bytes.extend_from_slice(&self.tag(&plaintext_be));
        Ok(Ciphertext::new(bytes))
    }

    async fn prove(
        &self,
        contract: &Address,
        user: &Address,
        ciphertext: &Ciphertext,
    ) -> Result<Proof, EncryptionError> {
        let mut hasher = Sha256::new();
        hasher.update(b"svp1");
        hasher.update(contract.as_str().as_bytes());
        hasher.update(user.as_str().as_bytes());
        hasher.update(ciphertext.as_bytes());
        Ok(Proof::new(hasher.finalize().to_vec()))
    }

    async fn decrypt(
        &self,
        contract: &Address,
        user: &Address,
        ciphertext: &Ciphertext,
    ) -> Result<i64, DecryptionError> {
        if !self.authorized(contract, user) {
            return Err(DecryptionError::Unauthorized {
                contract: contract.clone(),
                user: user.clone(),
            });
        }

        let bytes = ciphertext.as_bytes();
        if bytes.len() != MOCK_MAGIC.len() + 8 + TAG_LEN || &bytes[..4] != MOCK_MAGIC {
            return Err(DecryptionError::Malformed(
                "unrecognized ciphertext framing".to_string(),
            ));
        }
        let plaintext_be: [u8; 8] = bytes[4..12]
            .try_into()
            .map_err(|_| DecryptionError::Malformed("truncated ciphertext".to_string()))?;
        if bytes[12..] != self.tag(&plaintext_be)[..] {
            return Err(DecryptionError::Malformed(
                "integrity tag mismatch".to_string(),
            ));
        }
        Ok(i64::from_be_bytes(plaintext_be))
    }
}

/// Mock provider, counting backend constructions.
#[derive(Debug)]
pub struct MockFheProvider {
    backend: Arc<MockFheBackend>,
    fail_connect: bool,
    connects: AtomicUsize,
}

impl MockFheProvider {
    pub fn new(backend: MockFheBackend) -> Self {
        Self {
            backend: Arc::new(backend),
            fail_connect: false,
            connects: AtomicUsize::new(0),
        }
    }

    /// A provider whose `connect` always fails.
    pub fn failing() -> Self {
        Self {
            backend: Arc::new(MockFheBackend::new()),
            fail_connect: true,
            connects: AtomicUsize::new(0),
        }
    }

    /// Number of `connect` calls observed so far.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl Default for MockFheProvider {
    fn default() -> Self {
        Self::new(MockFheBackend::new())
    }
}

#[async_trait]
impl FheProvider for MockFheProvider {
    async fn connect(&self) -> Result<Arc<dyn FheBackend>, EncryptionError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail_connect {
            return Err(EncryptionError::Backend(
                "mock key material unavailable".to_string(),
            ));
        }
        Ok(self.backend.clone())
    }
}
