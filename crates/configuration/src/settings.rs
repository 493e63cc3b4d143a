use crate::error::ConfigError;
use core_types::ZeroPolicy;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section is optional in the file; missing sections and keys fall back
/// to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub metrics: MetricsSettings,
    pub indicators: IndicatorParams,
    pub screener: ScreenerSettings,
    pub logging: LoggingSettings,
}

/// Contains parameters for the accuracy metrics.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricsSettings {
    /// What MAPE does with observed values of exactly zero.
    pub zero_policy: ZeroPolicy,
}

/// Window lengths for the technical indicators.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub sma_fast_period: usize,
    pub sma_slow_period: usize,
    pub rsi_period: usize,
    pub macd_fast_period: usize,
    pub macd_slow_period: usize,
    pub macd_signal_period: usize,
    pub bollinger_period: usize,
    /// Width of the Bollinger Bands in standard deviations.
    pub bollinger_std_dev: f64,
    /// Window of the rolling standard deviation reported as volatility.
    pub volatility_period: usize,
}

/// Contains parameters for company search and ranking.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScreenerSettings {
    /// Maximum number of matches returned by a search.
    pub search_limit: usize,
    /// Number of entries kept in a top-performers ranking.
    pub top_performers_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive. `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

// --- Default Implementations ---
// This allows a user to omit any section from their toml
// and still have it work with sensible defaults.

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_fast_period: 50,
            sma_slow_period: 200,
            rsi_period: 14,
            macd_fast_period: 12,
            macd_slow_period: 26,
            macd_signal_period: 9,
            bollinger_period: 20,
            bollinger_std_dev: 2.0,
            volatility_period: 20,
        }
    }
}

impl Default for ScreenerSettings {
    fn default() -> Self {
        Self {
            search_limit: 10,
            top_performers_limit: 10,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl Config {
    /// Rejects settings that would make a calculation meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.indicators.validate()?;

        if self.screener.search_limit == 0 || self.screener.top_performers_limit == 0 {
            return Err(ConfigError::ValidationError(
                "Screener limits must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl IndicatorParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("sma_fast_period", self.sma_fast_period),
            ("sma_slow_period", self.sma_slow_period),
            ("rsi_period", self.rsi_period),
            ("macd_fast_period", self.macd_fast_period),
            ("macd_slow_period", self.macd_slow_period),
            ("macd_signal_period", self.macd_signal_period),
            ("bollinger_period", self.bollinger_period),
            ("volatility_period", self.volatility_period),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(ConfigError::ValidationError(format!(
                "Indicator period '{name}' cannot be zero"
            )));
        }

        // Sample standard deviation needs at least two points per window.
        if self.bollinger_period < 2 || self.volatility_period < 2 {
            return Err(ConfigError::ValidationError(
                "Bollinger and volatility windows need at least 2 bars".to_string(),
            ));
        }

        if self.sma_fast_period >= self.sma_slow_period {
            return Err(ConfigError::ValidationError(
                "Fast SMA period must be less than slow SMA period".to_string(),
            ));
        }
        if self.macd_fast_period >= self.macd_slow_period {
            return Err(ConfigError::ValidationError(
                "Fast MACD period must be less than slow MACD period".to_string(),
            ));
        }
        if !(self.bollinger_std_dev.is_finite() && self.bollinger_std_dev > 0.0) {
            return Err(ConfigError::ValidationError(
                "Bollinger band width must be a positive number".to_string(),
            ));
        }

        Ok(())
    }
}
