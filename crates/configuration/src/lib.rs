use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Config, IndicatorParams, LoggingSettings, MetricsSettings, ScreenerSettings};

/// File looked up in the working directory when no explicit path is given.
pub const DEFAULT_CONFIG_NAME: &str = "foresight";

/// Prefix of the environment variables that override file settings,
/// e.g. `FORESIGHT__METRICS__ZERO_POLICY=skip`.
pub const ENV_PREFIX: &str = "FORESIGHT";

/// Loads and validates the application configuration.
///
/// With `path` set, that file must exist. Otherwise `foresight.toml` in the
/// working directory is used when present. Environment variables are layered
/// on top of the file, and built-in defaults fill whatever is left.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let builder = config::Config::builder();
    let builder = match path {
        Some(path) => builder.add_source(config::File::from(path)),
        None => builder.add_source(config::File::with_name(DEFAULT_CONFIG_NAME).required(false)),
    };

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = settings.try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::ZeroPolicy;
    use std::fs;

    fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foresight.toml");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.metrics.zero_policy, ZeroPolicy::Fail);
        assert_eq!(config.indicators.sma_fast_period, 50);
        assert_eq!(config.screener.search_limit, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let (_dir, path) = write_config(
            r#"
            [metrics]
            zero_policy = "skip"

            [indicators]
            rsi_period = 21
            "#,
        );

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.metrics.zero_policy, ZeroPolicy::Skip);
        assert_eq!(config.indicators.rsi_period, 21);
        assert_eq!(config.indicators.sma_slow_period, 200);
        assert_eq!(config.screener.top_performers_limit, 10);
    }

    #[test]
    fn invalid_periods_are_rejected() {
        let (_dir, path) = write_config(
            r#"
            [indicators]
            sma_fast_period = 200
            sma_slow_period = 50
            "#,
        );

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn zero_limits_are_rejected() {
        let mut config = Config::default();
        config.screener.search_limit = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));
    }

    #[test]
    fn unknown_zero_policy_is_an_error() {
        let (_dir, path) = write_config("[metrics]\nzero_policy = \"ignore\"\n");
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn single_bar_deviation_windows_are_rejected() {
        let mut config = Config::default();
        config.indicators.volatility_period = 1;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }
}
