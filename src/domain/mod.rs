//! Domain types for the confidential vault client.
//!
//! This module provides:
//! - Domain primitives: TimeMs, Address, PositionId
//! - Position types: plaintext input, derived metrics, full record
//! - PortfolioSummary aggregate

pub mod portfolio;
pub mod position;
pub mod primitives;

pub use portfolio::PortfolioSummary;
pub use position::{Position, PositionInput, PositionMetrics};
pub use primitives::{Address, PositionId, TimeMs};
