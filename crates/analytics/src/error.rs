use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Failures that abort a whole calculation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Invalid input: the {0} series is empty")]
    EmptySeries(SeriesKind),

    #[error("Invalid input: series lengths differ (observed {observed}, predicted {predicted})")]
    LengthMismatch { observed: usize, predicted: usize },

    #[error("Invalid input: non-finite value {value} in the {series} series at index {index}")]
    NonFiniteValue {
        series: SeriesKind,
        index: usize,
        value: f64,
    },

    #[error("The price history and the forecast share no dates")]
    NoOverlap,

    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    #[error("Calculation error: Division by zero encountered in metric '{0}'")]
    DivisionByZero(String),
}

impl AnalyticsError {
    /// True for the errors raised by input validation, before anything is computed.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            AnalyticsError::EmptySeries(_)
                | AnalyticsError::LengthMismatch { .. }
                | AnalyticsError::NonFiniteValue { .. }
        )
    }
}

/// Failure of a single metric inside an otherwise valid report.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum MetricError {
    #[error("Division by zero in metric 'mape': observed value at index {index} is zero")]
    ZeroObservation { index: usize },

    #[error("Division by zero in metric 'mape': every observed value is zero")]
    AllObservationsZero,

    #[error("Division by zero in metric 'r2': zero variance in observed series")]
    ZeroVariance,

    #[error("Metric '{metric}' needs at least {required} points, got {actual}")]
    InsufficientData {
        metric: MetricKind,
        required: usize,
        actual: usize,
    },

    #[error("Metric '{metric}' overflowed to a non-finite value")]
    NonFinite { metric: MetricKind },
}

impl MetricError {
    /// True when the metric failed because its denominator was exactly zero.
    pub fn is_division_by_zero(&self) -> bool {
        matches!(
            self,
            MetricError::ZeroObservation { .. }
                | MetricError::AllObservationsZero
                | MetricError::ZeroVariance
        )
    }
}

/// Which input series an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeriesKind {
    Observed,
    Predicted,
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesKind::Observed => f.write_str("observed"),
            SeriesKind::Predicted => f.write_str("predicted"),
        }
    }
}

/// Names the metric a `MetricError` belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Mape,
    Rmse,
    R2,
    DirectionalAccuracy,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricKind::Mape => "mape",
            MetricKind::Rmse => "rmse",
            MetricKind::R2 => "r2",
            MetricKind::DirectionalAccuracy => "directional_accuracy",
        };
        f.write_str(name)
    }
}
