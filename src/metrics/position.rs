//! Per-position metric calculator.

use crate::domain::PositionMetrics;

/// Round to two decimal places, half away from zero.
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Compute a position's derived metrics from plaintext inputs.
///
/// Pure and total for finite inputs: the zero-cost-basis case (zero entry
/// price or zero amount) yields a 0 pnl percentage instead of dividing by
/// zero, which in turn pins risk at 0 and diversification at 100.
///
/// Risk scales linearly at 4 points per percent of |pnl| and is capped at 80
/// once |pnl_percentage| exceeds 20. Diversification is the inverse score,
/// clamped to [0, 100].
pub fn calculate_position_metrics(
    entry_price: f64,
    current_price: f64,
    amount: f64,
) -> PositionMetrics {
    let value = current_price * amount;
    let pnl = (current_price - entry_price) * amount;

    let cost_basis = entry_price * amount;
    let pnl_percentage = if entry_price > 0.0 && cost_basis != 0.0 {
        round2(pnl / cost_basis * 100.0)
    } else {
        0.0
    };

    let magnitude = pnl_percentage.abs();
    let risk = if magnitude > 20.0 {
        80u8
    } else {
        (magnitude * 4.0).round() as u8
    };
    let diversification = (100.0 - f64::from(risk)).clamp(0.0, 100.0).round() as u8;

    PositionMetrics {
        value,
        pnl: pnl.round() as i64,
        pnl_percentage,
        risk,
        diversification,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profitable_position() {
        let m = calculate_position_metrics(100.0, 130.0, 10.0);
        assert_eq!(m.value, 1300.0);
        assert_eq!(m.pnl, 300);
        assert_eq!(m.pnl_percentage, 30.0);
        assert_eq!(m.risk, 80);
        assert_eq!(m.diversification, 20);
    }

    #[test]
    fn test_losing_position() {
        let m = calculate_position_metrics(100.0, 90.0, 10.0);
        assert_eq!(m.value, 900.0);
        assert_eq!(m.pnl, -100);
        assert_eq!(m.pnl_percentage, -10.0);
        assert_eq!(m.risk, 40);
        assert_eq!(m.diversification, 60);
    }

    #[test]
    fn test_zero_entry_price() {
        let m = calculate_position_metrics(0.0, 50.0, 10.0);
        assert_eq!(m.pnl_percentage, 0.0);
        assert_eq!(m.risk, 0);
        assert_eq!(m.diversification, 100);
        assert_eq!(m.value, 500.0);
    }

    #[test]
    fn test_zero_amount() {
        let m = calculate_position_metrics(100.0, 130.0, 0.0);
        assert_eq!(m.value, 0.0);
        assert_eq!(m.pnl, 0);
        assert_eq!(m.pnl_percentage, 0.0);
        assert_eq!(m.risk, 0);
    }

    #[test]
    fn test_risk_cap_boundary() {
        // Exactly 20% keeps the linear scale; just above caps at 80.
        let at_cap = calculate_position_metrics(100.0, 120.0, 1.0);
        assert_eq!(at_cap.pnl_percentage, 20.0);
        assert_eq!(at_cap.risk, 80);

        let above_cap = calculate_position_metrics(100.0, 121.0, 1.0);
        assert_eq!(above_cap.pnl_percentage, 21.0);
        assert_eq!(above_cap.risk, 80);
    }

    #[test]
    fn test_pnl_percentage_rounds_to_two_decimals() {
        // 1/3 gain on a 3-unit basis: 0.333...% scaled.
        let m = calculate_position_metrics(300.0, 301.0, 1.0);
        assert_eq!(m.pnl_percentage, 0.33);
    }

    #[test]
    fn test_risk_bounds_hold_across_sweep() {
        for entry in [0.0, 1.0, 50.0, 100.0, 10_000.0] {
            for current in [0.0, 1.0, 75.0, 100.0, 250.0, 10_000.0] {
                for amount in [0.0, 0.5, 1.0, 10.0, 1_000.0] {
                    let m = calculate_position_metrics(entry, current, amount);
                    assert!(m.risk <= 80, "risk out of range: {:?}", m);
                    assert!(m.diversification <= 100, "diversification out of range: {:?}", m);
                    assert_eq!(m.diversification, 100 - m.risk);
                }
            }
        }
    }
}
