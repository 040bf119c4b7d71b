//! Position types: plaintext business input, derived metrics, full position record.

use serde::{Deserialize, Serialize};

use super::{PositionId, TimeMs};
use crate::metrics::calculate_position_metrics;

/// Plaintext business input for creating a position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionInput {
    /// Quantity of the underlying asset. Must be non-negative.
    pub amount: f64,
    /// Vault shares associated with the position.
    pub shares: f64,
    /// Price at which the position was entered.
    pub entry_price: f64,
}

impl PositionInput {
    pub fn new(amount: f64, shares: f64, entry_price: f64) -> Self {
        Self {
            amount,
            shares,
            entry_price,
        }
    }
}

/// Metrics derived from a position's entry price, current price and amount.
///
/// Invariants: `risk` is in [0, 80], `diversification` is in [0, 100], and
/// `pnl_percentage` is 0 whenever the entry price is 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionMetrics {
    /// Mark value: current price times amount.
    pub value: f64,
    /// Profit and loss, rounded to the nearest integer.
    pub pnl: i64,
    /// Profit and loss as a percentage of cost basis, rounded to 2 decimals.
    pub pnl_percentage: f64,
    /// Risk score in [0, 80], capped once |pnl_percentage| exceeds 20.
    pub risk: u8,
    /// Inverse-risk score in [0, 100].
    pub diversification: u8,
}

/// A single tracked holding with its derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Identifier assigned by the ledger on creation.
    pub id: PositionId,
    pub amount: f64,
    pub shares: f64,
    pub entry_price: f64,
    pub current_price: f64,
    pub metrics: PositionMetrics,
    pub is_active: bool,
    pub created_at: TimeMs,
    pub updated_at: TimeMs,
}

impl Position {
    /// Build the local plaintext record for a freshly created position.
    ///
    /// The current price starts at the entry price, so pnl is 0 and
    /// diversification is 100.
    pub fn open(id: PositionId, input: &PositionInput) -> Self {
        let now = TimeMs::now();
        let metrics =
            calculate_position_metrics(input.entry_price, input.entry_price, input.amount);
        Self {
            id,
            amount: input.amount,
            shares: input.shares,
            entry_price: input.entry_price,
            current_price: input.entry_price,
            metrics,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an update, recomputing derived metrics against the new mark.
    pub fn apply_update(&mut self, new_amount: f64, new_shares: f64, new_current_price: f64) {
        self.amount = new_amount;
        self.shares = new_shares;
        self.current_price = new_current_price;
        self.metrics = calculate_position_metrics(self.entry_price, new_current_price, new_amount);
        self.updated_at = TimeMs::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_starts_flat() {
        let input = PositionInput::new(10.0, 5.0, 100.0);
        let pos = Position::open(PositionId::new(1), &input);
        assert_eq!(pos.current_price, 100.0);
        assert_eq!(pos.metrics.pnl, 0);
        assert_eq!(pos.metrics.risk, 0);
        assert_eq!(pos.metrics.diversification, 100);
        assert!(pos.is_active);
        assert_eq!(pos.created_at, pos.updated_at);
    }

    #[test]
    fn test_apply_update_recomputes_metrics() {
        let input = PositionInput::new(10.0, 5.0, 100.0);
        let mut pos = Position::open(PositionId::new(1), &input);
        pos.apply_update(10.0, 5.0, 130.0);
        assert_eq!(pos.current_price, 130.0);
        assert_eq!(pos.metrics.value, 1300.0);
        assert_eq!(pos.metrics.pnl, 300);
        // Entry price is preserved across updates.
        assert_eq!(pos.entry_price, 100.0);
    }
}
