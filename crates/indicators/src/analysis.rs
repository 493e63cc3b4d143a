use crate::engine::IndicatorRow;
use crate::error::IndicatorError;
use core_types::TrendStatus;
use serde::Serialize;

/// Where the latest close sits relative to its fast and slow moving averages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendAnalysis {
    pub status: TrendStatus,
    pub price: f64,
    pub sma_fast: f64,
    pub sma_slow: f64,
    pub price_vs_sma_fast_pct: f64,
    pub sma_fast_vs_sma_slow_pct: f64,
}

impl TrendAnalysis {
    /// Reads the trend off the last row, which must carry both moving averages.
    pub fn from_rows(rows: &[IndicatorRow]) -> Result<Self, IndicatorError> {
        let last = rows
            .last()
            .ok_or_else(|| IndicatorError::NotEnoughData("no price bars".to_string()))?;

        let (Some(sma_fast), Some(sma_slow)) = (last.sma_fast, last.sma_slow) else {
            return Err(IndicatorError::NotEnoughData(format!(
                "trend analysis needs both moving averages, {} bars are not enough",
                rows.len()
            )));
        };
        if sma_fast == 0.0 || sma_slow == 0.0 {
            return Err(IndicatorError::Calculation(
                "moving average of zero in trend analysis".to_string(),
            ));
        }

        let price = last.close;
        let status = if price > sma_fast && sma_fast > sma_slow {
            TrendStatus::Bullish
        } else if price < sma_fast && sma_fast < sma_slow {
            TrendStatus::Bearish
        } else {
            TrendStatus::Mixed
        };

        Ok(Self {
            status,
            price,
            sma_fast,
            sma_slow,
            price_vs_sma_fast_pct: (price / sma_fast - 1.0) * 100.0,
            sma_fast_vs_sma_slow_pct: (sma_fast / sma_slow - 1.0) * 100.0,
        })
    }
}

/// How the latest rolling volatility compares with its own history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolatilityAnalysis {
    pub current: f64,
    pub average: f64,
    /// `current / average`. `None` when the average is zero.
    pub ratio: Option<f64>,
    /// Percentile rank of `current` among all available volatility values.
    pub percentile: f64,
}

impl VolatilityAnalysis {
    pub fn from_rows(rows: &[IndicatorRow]) -> Result<Self, IndicatorError> {
        let values: Vec<f64> = rows.iter().filter_map(|r| r.volatility).collect();
        let Some(&current) = values.last() else {
            return Err(IndicatorError::NotEnoughData(
                "no volatility values; the series is shorter than the volatility window".to_string(),
            ));
        };

        let average = values.iter().sum::<f64>() / values.len() as f64;
        let ratio = (average > 0.0).then(|| current / average);

        Ok(Self {
            current,
            average,
            ratio,
            percentile: percentile_of_score(&values, current),
        })
    }
}

/// Percentile rank of `score` within `values`, from 0 to 100.
///
/// Matching values share the mean of their 1-based ranks, so `score` equal to
/// every one of three values ranks at 2 of 3.
pub fn percentile_of_score(values: &[f64], score: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let below = values.iter().filter(|v| **v < score).count();
    let at_or_below = values.iter().filter(|v| **v <= score).count();
    let tie_bonus = usize::from(at_or_below > below);
    (below + at_or_below + tie_bonus) as f64 * 50.0 / values.len() as f64
}
