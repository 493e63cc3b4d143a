use serde::{Deserialize, Serialize};
use std::fmt;

/// How MAPE treats observations that are exactly zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ZeroPolicy {
    /// The metric fails, naming the first zero observation.
    #[default]
    Fail,
    /// Zero observations are left out and the mean runs over the remaining points.
    Skip,
}

/// The lookback window used when ranking price changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [
        Timeframe::Daily,
        Timeframe::Weekly,
        Timeframe::Monthly,
        Timeframe::Yearly,
    ];

    /// Number of bars to look back from the latest close.
    ///
    /// `None` means the comparison is against the first bar of the series.
    pub fn lookback(&self) -> Option<usize> {
        match self {
            Timeframe::Daily => Some(1),
            Timeframe::Weekly => Some(5),
            Timeframe::Monthly => Some(21),
            Timeframe::Yearly => None,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Timeframe::Daily => "daily",
            Timeframe::Weekly => "weekly",
            Timeframe::Monthly => "monthly",
            Timeframe::Yearly => "yearly",
        };
        f.write_str(name)
    }
}

/// A technical indicator that can be requested for a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum Indicator {
    SmaFast,
    SmaSlow,
    Rsi,
    Macd,
    Bollinger,
    Volatility,
}

impl Indicator {
    pub const ALL: [Indicator; 6] = [
        Indicator::SmaFast,
        Indicator::SmaSlow,
        Indicator::Rsi,
        Indicator::Macd,
        Indicator::Bollinger,
        Indicator::Volatility,
    ];
}

/// Direction of the price relative to its moving averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendStatus {
    Bullish,
    Bearish,
    Mixed,
}

impl fmt::Display for TrendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrendStatus::Bullish => "Bullish",
            TrendStatus::Bearish => "Bearish",
            TrendStatus::Mixed => "Mixed",
        };
        f.write_str(name)
    }
}
