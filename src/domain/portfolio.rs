//! Portfolio summary: aggregate metrics across all of a user's positions.

use serde::{Deserialize, Serialize};

/// Aggregate portfolio metrics.
///
/// Totals are sums across positions; `risk_exposure` and
/// `diversification_score` are arithmetic means. All four numeric fields are
/// exactly 0 for an empty position set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_value: i64,
    pub total_pnl: i64,
    /// Mean position risk, in [0, 80].
    pub risk_exposure: u8,
    /// Mean position diversification, in [0, 100].
    pub diversification_score: u8,
    /// Whether the portfolio is held in private (encrypted) mode.
    pub is_private: bool,
}

impl PortfolioSummary {
    /// The summary of an empty portfolio.
    pub fn empty() -> Self {
        Self {
            total_value: 0,
            total_pnl: 0,
            risk_exposure: 0,
            diversification_score: 0,
            is_private: true,
        }
    }
}
