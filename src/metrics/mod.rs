//! Pure plaintext metric calculators.
//!
//! Everything here is deterministic, does no I/O, and never fails for finite
//! numeric input. Derived values are computed locally before the sensitive
//! fields are handed to the encryption gateway.

pub mod portfolio;
pub mod position;

pub use portfolio::calculate_portfolio_metrics;
pub use position::calculate_position_metrics;
