use crate::engine::MetricsCalculator;
use crate::error::{AnalyticsError, MetricError, MetricKind};
use crate::report::{AccuracyReport, MetricResult};
use chrono::NaiveDate;
use core_types::{ForecastPoint, PriceBar};
use serde::Serialize;
use std::collections::BTreeMap;

/// The dates over which a forecast was scored against history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub history_points: usize,
    pub forecast_points: usize,
    /// Dates present in both the history and the forecast.
    pub matched_points: usize,
    /// Forecast dates after the last historical date.
    pub future_points: usize,
}

/// The result of scoring a forecast over the window it shares with history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastEvaluation {
    pub window: EvaluationWindow,
    pub accuracy: AccuracyReport,
    /// Percentage of steps where the forecast moved in the same direction as the price.
    pub directional_accuracy: MetricResult,
}

/// Aligns a forecast with price history and scores the overlap.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForecastEvaluator {
    calculator: MetricsCalculator,
}

impl ForecastEvaluator {
    pub fn new(calculator: MetricsCalculator) -> Self {
        Self { calculator }
    }

    /// Scores `forecast` against the closes in `history` on the dates both cover.
    ///
    /// Duplicate dates on either side keep their last occurrence.
    pub fn evaluate(
        &self,
        history: &[PriceBar],
        forecast: &[ForecastPoint],
    ) -> Result<ForecastEvaluation, AnalyticsError> {
        let actual: BTreeMap<NaiveDate, f64> = history.iter().map(|b| (b.date, b.close)).collect();
        let predicted: BTreeMap<NaiveDate, f64> =
            forecast.iter().map(|p| (p.date, p.predicted)).collect();

        let (dates, (y_true, y_pred)): (Vec<NaiveDate>, (Vec<f64>, Vec<f64>)) = actual
            .iter()
            .filter_map(|(date, &close)| predicted.get(date).map(|&yhat| (*date, (close, yhat))))
            .unzip();

        let (Some(&start), Some(&end)) = (dates.first(), dates.last()) else {
            return Err(AnalyticsError::NoOverlap);
        };

        let future_points = match actual.keys().next_back() {
            Some(last) => predicted.range(*last..).filter(|(d, _)| *d > last).count(),
            None => predicted.len(),
        };

        let window = EvaluationWindow {
            start,
            end,
            history_points: actual.len(),
            forecast_points: predicted.len(),
            matched_points: dates.len(),
            future_points,
        };
        tracing::debug!(?window, "Aligned forecast with history");

        let accuracy = self.calculator.compute(&y_true, &y_pred)?;
        let directional_accuracy = directional_accuracy(&y_true, &y_pred);

        Ok(ForecastEvaluation {
            window,
            accuracy,
            directional_accuracy,
        })
    }
}

/// Share of consecutive steps where both series move the same way, in percent.
///
/// A flat step counts as its own direction, so a flat actual only matches a flat prediction.
pub fn directional_accuracy(y_true: &[f64], y_pred: &[f64]) -> MetricResult {
    let steps = y_true.len().min(y_pred.len()).saturating_sub(1);
    if steps == 0 {
        return Err(MetricError::InsufficientData {
            metric: MetricKind::DirectionalAccuracy,
            required: 2,
            actual: y_true.len().min(y_pred.len()),
        });
    }

    let hits = y_true
        .windows(2)
        .zip(y_pred.windows(2))
        .filter(|(a, p)| direction(a[1] - a[0]) == direction(p[1] - p[0]))
        .count();

    Ok(hits as f64 / steps as f64 * 100.0)
}

fn direction(delta: f64) -> i8 {
    if delta > 0.0 {
        1
    } else if delta < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn bar(d: u32, close: f64) -> PriceBar {
        PriceBar {
            date: day(d),
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }

    fn point(d: u32, predicted: f64) -> ForecastPoint {
        ForecastPoint {
            date: day(d),
            predicted,
            lower_bound: predicted - 1.0,
            upper_bound: predicted + 1.0,
        }
    }

    #[test]
    fn scores_only_the_overlapping_window() {
        let history = vec![bar(1, 100.0), bar(2, 200.0), bar(3, 300.0), bar(4, 400.0)];
        let forecast = vec![
            point(2, 190.0),
            point(3, 320.0),
            point(4, 400.0),
            point(5, 410.0),
            point(6, 420.0),
        ];

        let eval = ForecastEvaluator::default().evaluate(&history, &forecast).unwrap();

        assert_eq!(eval.window.start, day(2));
        assert_eq!(eval.window.end, day(4));
        assert_eq!(eval.window.matched_points, 3);
        assert_eq!(eval.window.history_points, 4);
        assert_eq!(eval.window.forecast_points, 5);
        assert_eq!(eval.window.future_points, 2);
        assert_eq!(eval.accuracy.observations, 3);
        assert!(eval.accuracy.is_complete());
        assert_eq!(eval.directional_accuracy, Ok(100.0));
    }

    #[test]
    fn alignment_ignores_input_order() {
        let history = vec![bar(3, 30.0), bar(1, 10.0), bar(2, 20.0)];
        let forecast = vec![point(2, 21.0), point(1, 11.0), point(3, 29.0)];

        let eval = ForecastEvaluator::default().evaluate(&history, &forecast).unwrap();
        let direct = MetricsCalculator::default()
            .compute(&[10.0, 20.0, 30.0], &[11.0, 21.0, 29.0])
            .unwrap();
        assert_eq!(eval.accuracy, direct);
    }

    #[test]
    fn disjoint_dates_fail() {
        let err = ForecastEvaluator::default()
            .evaluate(&[bar(1, 1.0)], &[point(2, 1.0)])
            .unwrap_err();
        assert_eq!(err, AnalyticsError::NoOverlap);
    }

    #[test]
    fn single_match_has_no_direction() {
        let eval = ForecastEvaluator::default()
            .evaluate(&[bar(1, 10.0)], &[point(1, 11.0)])
            .unwrap();
        assert_eq!(
            eval.directional_accuracy,
            Err(MetricError::InsufficientData {
                metric: MetricKind::DirectionalAccuracy,
                required: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn directional_accuracy_counts_matching_moves() {
        // up, down, flat vs up, up, flat
        let actual = [1.0, 2.0, 1.0, 1.0];
        let predicted = [1.0, 3.0, 4.0, 4.0];
        let value = directional_accuracy(&actual, &predicted).unwrap();
        assert!((value - 200.0 / 3.0).abs() < 1e-9);
    }
}
