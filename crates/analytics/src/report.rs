use crate::error::{MetricError, MetricKind};
use serde::Serialize;

/// The outcome of one metric: a finite value or the reason it could not be computed.
pub type MetricResult = Result<f64, MetricError>;

/// Goodness-of-fit metrics for one observed/predicted pair of series.
///
/// This struct is the output of the `MetricsCalculator`. Each metric is
/// computed independently, so a failed MAPE still leaves RMSE and R² usable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyReport {
    /// Length of the input series.
    pub observations: usize,
    /// Points MAPE averaged over. Below `observations` only when zeros were skipped.
    pub mape_points: usize,

    /// Mean absolute percentage error, in percent.
    pub mape: MetricResult,
    /// Root mean squared error, in the units of the input.
    pub rmse: MetricResult,
    /// Coefficient of determination. Never above 1.0.
    pub r2: MetricResult,
}

impl AccuracyReport {
    /// True when every metric produced a value.
    pub fn is_complete(&self) -> bool {
        self.mape.is_ok() && self.rmse.is_ok() && self.r2.is_ok()
    }

    /// The metrics that failed, in report order.
    pub fn failures(&self) -> Vec<(MetricKind, &MetricError)> {
        [
            (MetricKind::Mape, &self.mape),
            (MetricKind::Rmse, &self.rmse),
            (MetricKind::R2, &self.r2),
        ]
        .into_iter()
        .filter_map(|(kind, result)| result.as_ref().err().map(|e| (kind, e)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(mape: MetricResult) -> AccuracyReport {
        AccuracyReport {
            observations: 3,
            mape_points: 3,
            mape,
            rmse: Ok(1.0),
            r2: Ok(0.5),
        }
    }

    #[test]
    fn complete_report_has_no_failures() {
        let r = report(Ok(2.0));
        assert!(r.is_complete());
        assert!(r.failures().is_empty());
    }

    #[test]
    fn failures_name_the_metric() {
        let r = report(Err(MetricError::ZeroObservation { index: 0 }));
        assert!(!r.is_complete());
        assert_eq!(
            r.failures(),
            vec![(MetricKind::Mape, &MetricError::ZeroObservation { index: 0 })]
        );
    }

    #[test]
    fn serializes_failures_as_err() {
        let r = report(Err(MetricError::ZeroVariance));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["rmse"]["Ok"], 1.0);
        assert_eq!(json["mape"]["Err"], "ZeroVariance");
    }
}
