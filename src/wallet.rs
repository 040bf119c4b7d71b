//! Wallet/session collaborator: supplies the current user address.

use std::fmt;

use crate::domain::Address;

/// Source of the currently authenticated user address, if any.
///
/// Write operations and user-scoped reads consult this synchronously before
/// doing any network work.
pub trait WalletSession: Send + Sync + fmt::Debug {
    fn address(&self) -> Option<Address>;
}

/// Fixed wallet session, connected or not.
#[derive(Debug, Clone)]
pub struct StaticWallet {
    address: Option<Address>,
}

impl StaticWallet {
    pub fn connected(address: Address) -> Self {
        Self {
            address: Some(address),
        }
    }

    pub fn disconnected() -> Self {
        Self { address: None }
    }
}

impl WalletSession for StaticWallet {
    fn address(&self) -> Option<Address> {
        self.address.clone()
    }
}
