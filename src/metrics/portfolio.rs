//! Portfolio reduction: fold per-position metrics into summary totals.

use crate::domain::{PortfolioSummary, PositionMetrics};

/// Reduce a collection of position metrics into a portfolio summary.
///
/// Values and pnl are summed; risk and diversification are averaged. The
/// empty collection short-circuits to exact zeros rather than dividing by
/// zero.
pub fn calculate_portfolio_metrics(positions: &[PositionMetrics]) -> PortfolioSummary {
    if positions.is_empty() {
        return PortfolioSummary::empty();
    }

    let mut total_value = 0.0f64;
    let mut total_pnl = 0i64;
    let mut risk_sum = 0u32;
    let mut diversification_sum = 0u32;

    for m in positions {
        total_value += m.value;
        total_pnl += m.pnl;
        risk_sum += u32::from(m.risk);
        diversification_sum += u32::from(m.diversification);
    }

    let count = positions.len() as f64;
    PortfolioSummary {
        total_value: total_value.round() as i64,
        total_pnl,
        risk_exposure: (f64::from(risk_sum) / count).round() as u8,
        diversification_score: (f64::from(diversification_sum) / count).round() as u8,
        is_private: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(value: f64, pnl: i64, risk: u8) -> PositionMetrics {
        PositionMetrics {
            value,
            pnl,
            pnl_percentage: 0.0,
            risk,
            diversification: 100 - risk,
        }
    }

    #[test]
    fn test_empty_portfolio_is_all_zeros() {
        let summary = calculate_portfolio_metrics(&[]);
        assert_eq!(summary.total_value, 0);
        assert_eq!(summary.total_pnl, 0);
        assert_eq!(summary.risk_exposure, 0);
        assert_eq!(summary.diversification_score, 0);
    }

    #[test]
    fn test_sums_and_averages() {
        let positions = vec![
            metrics(100.0, 10, 10),
            metrics(200.0, -5, 20),
            metrics(300.0, 25, 30),
        ];
        let summary = calculate_portfolio_metrics(&positions);
        assert_eq!(summary.total_value, 600);
        assert_eq!(summary.total_pnl, 30);
        assert_eq!(summary.risk_exposure, 20);
        assert_eq!(summary.diversification_score, 80);
    }

    #[test]
    fn test_average_rounds_to_nearest() {
        let positions = vec![metrics(1.0, 0, 10), metrics(1.0, 0, 15)];
        let summary = calculate_portfolio_metrics(&positions);
        // (10 + 15) / 2 = 12.5, rounds half away from zero.
        assert_eq!(summary.risk_exposure, 13);
    }

    #[test]
    fn test_fractional_values_round_after_summation() {
        let positions = vec![metrics(100.4, 0, 0), metrics(100.4, 0, 0)];
        let summary = calculate_portfolio_metrics(&positions);
        assert_eq!(summary.total_value, 201);
    }
}
