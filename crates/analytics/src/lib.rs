//! # Foresight Analytics Engine
//!
//! This crate scores forecasts against what actually happened and summarizes the
//! risk profile of a price series.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no I/O and no knowledge of where the numbers came from. It
//!   depends only on `core-types`.
//! - **Stateless calculation:** `MetricsCalculator` takes two borrowed series and
//!   returns an `AccuracyReport`. Nothing is cached between calls, so a calculator
//!   can be shared freely across threads.
//! - **Partial results:** a metric whose denominator is zero is reported as a
//!   `MetricError` next to the metrics that did succeed, never as `NaN`.
//!
//! ## Public API
//!
//! - `MetricsCalculator` / `AccuracyReport`: MAPE, RMSE and R².
//! - `ForecastEvaluator` / `ForecastEvaluation`: date alignment of a forecast with history.
//! - `RiskReport`: drawdown, value-at-risk, beta.
//! - `AnalyticsError`, `MetricError`: whole-call and per-metric failures.

pub mod engine;
pub mod error;
pub mod evaluation;
pub mod report;
pub mod risk;

// Re-export the key components to create a clean, public-facing API.
pub use engine::MetricsCalculator;
pub use error::{AnalyticsError, MetricError, MetricKind, SeriesKind};
pub use evaluation::{EvaluationWindow, ForecastEvaluation, ForecastEvaluator};
pub use report::{AccuracyReport, MetricResult};
pub use risk::RiskReport;
