use crate::error::{AnalyticsError, MetricError, MetricKind, SeriesKind};
use crate::report::{AccuracyReport, MetricResult};
use core_types::ZeroPolicy;

/// A stateless calculator for scoring a prediction series against observed values.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsCalculator {
    zero_policy: ZeroPolicy,
}

impl MetricsCalculator {
    pub fn new(zero_policy: ZeroPolicy) -> Self {
        Self { zero_policy }
    }

    pub fn zero_policy(&self) -> ZeroPolicy {
        self.zero_policy
    }

    /// The main entry point for calculating accuracy metrics.
    ///
    /// # Arguments
    ///
    /// * `y_true` - The observed values, one per time step.
    /// * `y_pred` - The predicted values for the same time steps.
    ///
    /// # Returns
    ///
    /// An `AccuracyReport` with a per-metric result, or an `AnalyticsError` when
    /// the inputs are empty, of different lengths, or contain non-finite values.
    pub fn compute(&self, y_true: &[f64], y_pred: &[f64]) -> Result<AccuracyReport, AnalyticsError> {
        validate(y_true, y_pred)?;

        let (mape, mape_points) = self.mape(y_true, y_pred);
        let report = AccuracyReport {
            observations: y_true.len(),
            mape_points,
            mape,
            rmse: rmse(y_true, y_pred),
            r2: r_squared(y_true, y_pred),
        };

        tracing::debug!(
            observations = report.observations,
            mape = ?report.mape,
            rmse = ?report.rmse,
            r2 = ?report.r2,
            "Computed accuracy report"
        );

        Ok(report)
    }

    /// Mean absolute percentage error, returned with the number of points it averaged over.
    fn mape(&self, y_true: &[f64], y_pred: &[f64]) -> (MetricResult, usize) {
        let mut sum = 0.0;
        let mut used = 0usize;

        for (index, (&actual, &predicted)) in y_true.iter().zip(y_pred).enumerate() {
            if actual == 0.0 {
                match self.zero_policy {
                    ZeroPolicy::Fail => return (Err(MetricError::ZeroObservation { index }), 0),
                    ZeroPolicy::Skip => continue,
                }
            }
            // Dividing first keeps `actual - predicted` from overflowing near f64::MAX.
            sum += (1.0 - predicted / actual).abs();
            used += 1;
        }

        if used == 0 {
            return (Err(MetricError::AllObservationsZero), 0);
        }

        let mape = (100.0 / used as f64) * sum;
        (finite(MetricKind::Mape, mape), used)
    }
}

/// Checks the shared preconditions of every metric.
fn validate(y_true: &[f64], y_pred: &[f64]) -> Result<(), AnalyticsError> {
    if y_true.is_empty() {
        return Err(AnalyticsError::EmptySeries(SeriesKind::Observed));
    }
    if y_pred.is_empty() {
        return Err(AnalyticsError::EmptySeries(SeriesKind::Predicted));
    }
    if y_true.len() != y_pred.len() {
        return Err(AnalyticsError::LengthMismatch {
            observed: y_true.len(),
            predicted: y_pred.len(),
        });
    }

    for (series, values) in [(SeriesKind::Observed, y_true), (SeriesKind::Predicted, y_pred)] {
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(AnalyticsError::NonFiniteValue { series, index, value });
        }
    }

    Ok(())
}

/// Largest magnitude across both series. Metrics work on values divided by it
/// so that squaring cannot overflow for finite inputs.
fn magnitude(y_true: &[f64], y_pred: &[f64]) -> f64 {
    y_true
        .iter()
        .chain(y_pred)
        .fold(0.0_f64, |max, v| max.max(v.abs()))
}

/// Sum of squared residuals of the series divided by `scale`.
fn scaled_squared_residuals(y_true: &[f64], y_pred: &[f64], scale: f64) -> f64 {
    y_true
        .iter()
        .zip(y_pred)
        .map(|(a, p)| {
            let r = a / scale - p / scale;
            r * r
        })
        .sum()
}

/// Root mean squared error.
fn rmse(y_true: &[f64], y_pred: &[f64]) -> MetricResult {
    let scale = magnitude(y_true, y_pred);
    if scale == 0.0 {
        return Ok(0.0);
    }

    let n = y_true.len() as f64;
    let scaled = (scaled_squared_residuals(y_true, y_pred, scale) / n).sqrt();
    finite(MetricKind::Rmse, scaled * scale)
}

/// Coefficient of determination.
fn r_squared(y_true: &[f64], y_pred: &[f64]) -> MetricResult {
    // Exact comparison: a floating-point mean of identical values can miss them by an ulp.
    if y_true.iter().all(|v| *v == y_true[0]) {
        return Err(MetricError::ZeroVariance);
    }

    // The ratio of the two sums does not depend on the scale.
    let scale = magnitude(y_true, y_pred);
    let n = y_true.len() as f64;
    let mean = y_true.iter().map(|v| v / scale).sum::<f64>() / n;
    let ss_total: f64 = y_true
        .iter()
        .map(|v| {
            let d = v / scale - mean;
            d * d
        })
        .sum();

    if ss_total == 0.0 {
        return Err(MetricError::ZeroVariance);
    }

    let ss_residual = scaled_squared_residuals(y_true, y_pred, scale);
    finite(MetricKind::R2, 1.0 - ss_residual / ss_total)
}

/// Turns an overflowed value into a metric failure.
fn finite(metric: MetricKind, value: f64) -> MetricResult {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MetricError::NonFinite { metric })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: MetricResult, expected: f64) {
        let value = actual.expect("metric should succeed");
        assert!(
            (value - expected).abs() < 1e-9,
            "expected {expected}, got {value}"
        );
    }

    #[test]
    fn perfect_prediction() {
        let y = [100.0, 110.0, 120.0];
        let report = MetricsCalculator::default().compute(&y, &y).unwrap();

        assert_eq!(report.mape, Ok(0.0));
        assert_eq!(report.rmse, Ok(0.0));
        assert_eq!(report.r2, Ok(1.0));
        assert!(report.is_complete());
    }

    #[test]
    fn imperfect_prediction_follows_the_formulas() {
        let report = MetricsCalculator::default()
            .compute(&[100.0, 200.0, 300.0], &[110.0, 190.0, 320.0])
            .unwrap();

        // (100/3) * (0.1 + 0.05 + 20/300)
        assert_close(report.mape, 100.0 / 3.0 * (0.1 + 0.05 + 20.0 / 300.0));
        // sqrt((100 + 100 + 400) / 3)
        assert_close(report.rmse, 200.0_f64.sqrt());
        // 1 - 600 / 20000
        assert_close(report.r2, 0.97);
    }

    #[test]
    fn zero_observation_fails_only_mape() {
        let report = MetricsCalculator::default()
            .compute(&[0.0, 10.0, 20.0], &[1.0, 9.0, 21.0])
            .unwrap();

        assert_eq!(report.mape, Err(MetricError::ZeroObservation { index: 0 }));
        assert_eq!(report.mape_points, 0);
        assert_close(report.rmse, 1.0);
        assert_close(report.r2, 1.0 - 3.0 / 200.0);
    }

    #[test]
    fn zero_observation_reports_first_index() {
        let report = MetricsCalculator::default()
            .compute(&[5.0, 0.0, 0.0], &[5.0, 1.0, 1.0])
            .unwrap();
        assert_eq!(report.mape, Err(MetricError::ZeroObservation { index: 1 }));
    }

    #[test]
    fn skip_policy_averages_over_non_zero_points() {
        let report = MetricsCalculator::new(ZeroPolicy::Skip)
            .compute(&[0.0, 10.0, 20.0], &[1.0, 9.0, 21.0])
            .unwrap();

        // (100/2) * (0.1 + 0.05)
        assert_close(report.mape, 7.5);
        assert_eq!(report.mape_points, 2);
        assert_eq!(report.observations, 3);
    }

    #[test]
    fn skip_policy_with_only_zeros() {
        let report = MetricsCalculator::new(ZeroPolicy::Skip)
            .compute(&[0.0, 0.0], &[1.0, -1.0])
            .unwrap();
        assert_eq!(report.mape, Err(MetricError::AllObservationsZero));
        assert_eq!(report.r2, Err(MetricError::ZeroVariance));
        assert_close(report.rmse, 1.0);
    }

    #[test]
    fn constant_observations_fail_r2() {
        let report = MetricsCalculator::default()
            .compute(&[50.0, 50.0, 50.0], &[48.0, 52.0, 50.0])
            .unwrap();

        assert_eq!(report.r2, Err(MetricError::ZeroVariance));
        assert!(report.r2.as_ref().unwrap_err().is_division_by_zero());
        assert_close(report.rmse, (8.0_f64 / 3.0).sqrt());
        assert_close(report.mape, 100.0 / 3.0 * (0.04 + 0.04));
    }

    #[test]
    fn constant_decimal_observations_fail_r2() {
        // The mean of [0.1; 3] rounds to 0.10000000000000002.
        let report = MetricsCalculator::default()
            .compute(&[0.1, 0.1, 0.1], &[0.2, 0.1, 0.0])
            .unwrap();
        assert_eq!(report.r2, Err(MetricError::ZeroVariance));

        let level = 1353.7506333325214;
        let report = MetricsCalculator::default()
            .compute(&[level; 7], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0])
            .unwrap();
        assert_eq!(report.r2, Err(MetricError::ZeroVariance));
    }

    #[test]
    fn large_finite_values_do_not_overflow() {
        let report = MetricsCalculator::default()
            .compute(&[1e200, 3e200], &[3e200, 1e200])
            .unwrap();

        let rmse = report.rmse.unwrap();
        assert!((rmse / 2e200 - 1.0).abs() < 1e-12, "rmse was {rmse}");
        // (100/2) * (2 + 2/3)
        let mape = report.mape.unwrap();
        assert!((mape - 100.0 / 2.0 * (2.0 + 2.0 / 3.0)).abs() < 1e-9);
        // Mean 2e200, ss_total 2e400, ss_residual 8e400.
        let r2 = report.r2.unwrap();
        assert!((r2 - (-3.0)).abs() < 1e-12);
    }

    #[test]
    fn single_observation_has_zero_variance() {
        let report = MetricsCalculator::default().compute(&[10.0], &[12.0]).unwrap();
        assert_close(report.mape, 20.0);
        assert_close(report.rmse, 2.0);
        assert_eq!(report.r2, Err(MetricError::ZeroVariance));
    }

    #[test]
    fn length_mismatch_is_invalid_input() {
        let err = MetricsCalculator::default()
            .compute(&[1.0, 2.0, 3.0], &[1.0, 2.0])
            .unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::LengthMismatch { observed: 3, predicted: 2 }
        );
        assert!(err.is_invalid_input());
    }

    #[test]
    fn empty_series_are_invalid_input() {
        let calc = MetricsCalculator::default();
        assert_eq!(
            calc.compute(&[], &[]).unwrap_err(),
            AnalyticsError::EmptySeries(SeriesKind::Observed)
        );
        assert_eq!(
            calc.compute(&[1.0], &[]).unwrap_err(),
            AnalyticsError::EmptySeries(SeriesKind::Predicted)
        );
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let err = MetricsCalculator::default()
            .compute(&[1.0, 2.0], &[1.0, f64::NAN])
            .unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::NonFiniteValue { series: SeriesKind::Predicted, index: 1, .. }
        ));

        let err = MetricsCalculator::default()
            .compute(&[f64::INFINITY, 2.0], &[1.0, 2.0])
            .unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::NonFiniteValue { series: SeriesKind::Observed, index: 0, .. }
        ));
    }

    #[test]
    fn overflow_is_reported_not_returned() {
        let report = MetricsCalculator::default()
            .compute(&[f64::MAX, -f64::MAX], &[-f64::MAX, f64::MAX])
            .unwrap();
        assert_eq!(report.rmse, Err(MetricError::NonFinite { metric: MetricKind::Rmse }));
        // The percentage errors themselves stay representable.
        assert_close(report.mape, 200.0);
        assert_close(report.r2, -3.0);
    }
}
