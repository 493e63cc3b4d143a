//! Technical indicators and the trend/volatility read-outs built on them.
//!
//! Indicator math comes from the `ta` crate; this crate adds warm-up handling,
//! indicator selection and the summary analyses shown next to a price chart.

pub mod analysis;
pub mod engine;
pub mod error;

pub use analysis::{percentile_of_score, TrendAnalysis, VolatilityAnalysis};
pub use engine::{IndicatorEngine, IndicatorRow};
pub use error::IndicatorError;
