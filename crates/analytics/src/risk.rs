use crate::error::AnalyticsError;
use chrono::NaiveDate;
use core_types::{closes, PriceBar};
use serde::Serialize;
use std::collections::BTreeMap;

/// Downside and market-exposure figures for a single price series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    /// Deepest fall from a running peak, in percent (zero or negative).
    pub max_drawdown_pct: f64,
    /// Distance of the latest close from its running peak, in percent.
    pub current_drawdown_pct: f64,
    /// 5th percentile of daily returns, in percent.
    pub var_95_pct: f64,
    /// 1st percentile of daily returns, in percent.
    pub var_99_pct: f64,
    /// Sensitivity to the market series. `None` without a usable market series.
    pub beta: Option<f64>,
    pub market_correlation: Option<f64>,
}

impl RiskReport {
    /// Builds the report from date-ordered bars and an optional market benchmark.
    pub fn from_bars(
        bars: &[PriceBar],
        market: Option<&[PriceBar]>,
    ) -> Result<Self, AnalyticsError> {
        if bars.len() < 2 {
            return Err(AnalyticsError::NotEnoughData(format!(
                "risk metrics need at least 2 bars, got {}",
                bars.len()
            )));
        }

        let prices = closes(bars);
        let daily = returns(&prices)?;
        let (max_drawdown, current_drawdown) = drawdowns(&prices)?;

        let (beta, market_correlation) = match market {
            Some(market) => market_exposure(bars, market)?,
            None => (None, None),
        };

        Ok(Self {
            max_drawdown_pct: max_drawdown * 100.0,
            current_drawdown_pct: current_drawdown * 100.0,
            var_95_pct: percentile(&daily, 5.0) * 100.0,
            var_99_pct: percentile(&daily, 1.0) * 100.0,
            beta,
            market_correlation,
        })
    }
}

/// Simple period-over-period returns.
pub fn returns(prices: &[f64]) -> Result<Vec<f64>, AnalyticsError> {
    prices
        .windows(2)
        .map(|w| {
            if w[0] == 0.0 {
                Err(AnalyticsError::DivisionByZero("returns".to_string()))
            } else {
                Ok(w[1] / w[0] - 1.0)
            }
        })
        .collect()
}

/// Returns `(max_drawdown, current_drawdown)` as fractions of the running peak.
fn drawdowns(prices: &[f64]) -> Result<(f64, f64), AnalyticsError> {
    let mut peak = f64::MIN;
    let mut max_drawdown = 0.0_f64;
    let mut current = 0.0;

    for &price in prices {
        peak = peak.max(price);
        if peak == 0.0 {
            return Err(AnalyticsError::DivisionByZero("drawdown".to_string()));
        }
        current = price / peak - 1.0;
        max_drawdown = max_drawdown.min(current);
    }

    Ok((max_drawdown, current))
}

/// Percentile with linear interpolation between the closest ranks.
///
/// `q` is in percent. The input must not be empty.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (q / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Beta and correlation of daily returns over the dates both series share.
fn market_exposure(
    bars: &[PriceBar],
    market: &[PriceBar],
) -> Result<(Option<f64>, Option<f64>), AnalyticsError> {
    let market_closes: BTreeMap<NaiveDate, f64> =
        market.iter().map(|b| (b.date, b.close)).collect();
    let (stock, bench): (Vec<f64>, Vec<f64>) = bars
        .iter()
        .filter_map(|b| market_closes.get(&b.date).map(|&m| (b.close, m)))
        .unzip();

    // Two returns are the minimum for a sample covariance.
    if stock.len() < 3 {
        tracing::debug!(aligned = stock.len(), "Too few shared dates for beta");
        return Ok((None, None));
    }

    let r = returns(&stock)?;
    let m = returns(&bench)?;

    let var_m = sample_covariance(&m, &m);
    let var_r = sample_covariance(&r, &r);
    if var_m == 0.0 {
        return Ok((None, None));
    }

    let cov = sample_covariance(&r, &m);
    let beta = cov / var_m;
    let correlation = if var_r > 0.0 {
        Some(cov / (var_r.sqrt() * var_m.sqrt()))
    } else {
        None
    };

    Ok((Some(beta), correlation))
}

fn sample_covariance(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum::<f64>()
        / (n - 1.0)
}
