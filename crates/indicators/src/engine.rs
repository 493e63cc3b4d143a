use crate::error::IndicatorError;
use chrono::NaiveDate;
use configuration::IndicatorParams;
use core_types::{Indicator, PriceBar};
use serde::Serialize;
use ta::indicators::{
    BollingerBands, MovingAverageConvergenceDivergence as Macd, SimpleMovingAverage as Sma,
    StandardDeviation,
};
use ta::Next;

/// Indicator values for one bar. `None` while an indicator is warming up or
/// when it was not requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: f64,
    pub sma_fast: Option<f64>,
    pub sma_slow: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub volatility: Option<f64>,
}

/// Runs the configured indicators over a price series.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    params: IndicatorParams,
}

/// The `ta` indicators for one pass over a series.
struct Pipeline {
    sma_fast: Sma,
    sma_slow: Sma,
    rsi_gain: Sma,
    rsi_loss: Sma,
    macd: Macd,
    bollinger: BollingerBands,
    volatility: StandardDeviation,
}

impl IndicatorEngine {
    /// Creates a new `IndicatorEngine`.
    ///
    /// It performs validation to ensure the parameters are logical.
    pub fn new(params: IndicatorParams) -> Result<Self, IndicatorError> {
        params
            .validate()
            .map_err(|e| IndicatorError::InvalidParameters(e.to_string()))?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    /// Computes the selected indicators for every bar, in input order.
    ///
    /// Bars are expected in chronological order.
    pub fn compute(
        &self,
        bars: &[PriceBar],
        selection: &[Indicator],
    ) -> Result<Vec<IndicatorRow>, IndicatorError> {
        let mut pipeline = self.pipeline()?;
        let p = &self.params;
        let wants = |indicator: Indicator| selection.contains(&indicator);

        let rows = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| {
                let seen = i + 1;
                let close = bar.close;

                // Every indicator consumes every bar so warm-up stays aligned with the series.
                let sma_fast = pipeline.sma_fast.next(close);
                let sma_slow = pipeline.sma_slow.next(close);
                let change = if i == 0 { 0.0 } else { close - bars[i - 1].close };
                let avg_gain = pipeline.rsi_gain.next(change.max(0.0));
                let avg_loss = pipeline.rsi_loss.next((-change).max(0.0));
                let macd = pipeline.macd.next(close);
                let bb = pipeline.bollinger.next(close);
                let volatility = pipeline.volatility.next(close);

                let mut row = IndicatorRow {
                    date: bar.date,
                    close,
                    ..Default::default()
                };

                if wants(Indicator::SmaFast) && seen >= p.sma_fast_period {
                    row.sma_fast = Some(sma_fast);
                }
                if wants(Indicator::SmaSlow) && seen >= p.sma_slow_period {
                    row.sma_slow = Some(sma_slow);
                }
                // RSI needs `period` price changes, i.e. one bar more than its window.
                // The first bar feeds a zero change, which has left the window by then.
                if wants(Indicator::Rsi) && seen > p.rsi_period {
                    row.rsi = rsi(avg_gain, avg_loss);
                }
                if wants(Indicator::Macd) {
                    row.macd = Some(macd.macd);
                    row.macd_signal = Some(macd.signal);
                    row.macd_histogram = Some(macd.histogram);
                }
                if wants(Indicator::Bollinger) && seen >= p.bollinger_period {
                    let width = (bb.upper - bb.average) * sample_correction(p.bollinger_period);
                    row.bb_upper = Some(bb.average + width);
                    row.bb_middle = Some(bb.average);
                    row.bb_lower = Some(bb.average - width);
                }
                if wants(Indicator::Volatility) && seen >= p.volatility_period {
                    row.volatility = Some(volatility * sample_correction(p.volatility_period));
                }

                row
            })
            .collect::<Vec<_>>();

        tracing::debug!(bars = bars.len(), ?selection, "Computed indicator rows");
        Ok(rows)
    }

    fn pipeline(&self) -> Result<Pipeline, IndicatorError> {
        let p = &self.params;
        Ok(Pipeline {
            sma_fast: Sma::new(p.sma_fast_period).map_err(|e| {
                IndicatorError::InvalidParameters(format!("Failed to initialize fast SMA: {:?}", e))
            })?,
            sma_slow: Sma::new(p.sma_slow_period).map_err(|e| {
                IndicatorError::InvalidParameters(format!("Failed to initialize slow SMA: {:?}", e))
            })?,
            rsi_gain: Sma::new(p.rsi_period).map_err(|e| {
                IndicatorError::InvalidParameters(format!("Failed to initialize RSI: {:?}", e))
            })?,
            rsi_loss: Sma::new(p.rsi_period).map_err(|e| {
                IndicatorError::InvalidParameters(format!("Failed to initialize RSI: {:?}", e))
            })?,
            macd: Macd::new(p.macd_fast_period, p.macd_slow_period, p.macd_signal_period)
                .map_err(|e| {
                    IndicatorError::InvalidParameters(format!("Failed to initialize MACD: {:?}", e))
                })?,
            bollinger: BollingerBands::new(p.bollinger_period, p.bollinger_std_dev).map_err(|e| {
                IndicatorError::InvalidParameters(format!(
                    "Failed to initialize Bollinger Bands: {:?}",
                    e
                ))
            })?,
            volatility: StandardDeviation::new(p.volatility_period).map_err(|e| {
                IndicatorError::InvalidParameters(format!(
                    "Failed to initialize volatility window: {:?}",
                    e
                ))
            })?,
        })
    }
}

/// Relative strength index from simple averages of gains and losses.
///
/// Undefined when the window saw no movement at all.
fn rsi(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        return (avg_gain > 0.0).then_some(100.0);
    }
    Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
}

/// Turns a population standard deviation over `n` bars into the sample one.
fn sample_correction(n: usize) -> f64 {
    (n as f64 / (n as f64 - 1.0)).sqrt()
}
