use analytics::{ForecastEvaluator, MetricsCalculator, RiskReport};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use configuration::{load_config, Config};
use core_types::{Indicator, Timeframe, ZeroPolicy};
use indicators::{IndicatorEngine, IndicatorRow, TrendAnalysis, VolatilityAnalysis};
use output::OutputFormat;
use screener::{PriceTable, Screener};
use serde::Serialize;
use std::path::PathBuf;

mod input;
mod logging;
mod output;

/// The main entry point for the Foresight forecast analysis tool.
fn main() -> Result<()> {
    // Load environment variables from .env file, if there is one
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let _log_guard = logging::init(&config.logging)?;
    tracing::debug!(?config, "Configuration loaded");

    // Execute the appropriate command
    match cli.command {
        Commands::Metrics(args) => handle_metrics(args, &config, cli.format),
        Commands::Evaluate(args) => handle_evaluate(args, &config, cli.format),
        Commands::Indicators(args) => handle_indicators(args, &config, cli.format),
        Commands::Risk(args) => handle_risk(args, cli.format),
        Commands::Search(args) => handle_search(args, &config, cli.format),
        Commands::Sectors(args) => handle_sectors(args, &config, cli.format),
        Commands::Top(args) => handle_top(args, &config, cli.format),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Forecast accuracy metrics, technical indicators and stock screening.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file. Defaults to `foresight.toml` in the working directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute MAPE, RMSE and R² for an observed and a predicted series.
    Metrics(MetricsArgs),
    /// Score a forecast against the price history it overlaps.
    Evaluate(EvaluateArgs),
    /// Compute technical indicators and the trend/volatility read-out for a stock.
    Indicators(IndicatorsArgs),
    /// Drawdown, value-at-risk and market beta of a stock.
    Risk(RiskArgs),
    /// Find companies by symbol or name.
    Search(SearchArgs),
    /// Group the company universe by sector.
    Sectors(SectorsArgs),
    /// Rank companies by price change.
    Top(TopArgs),
}

#[derive(Parser)]
struct MetricsArgs {
    /// JSON file with `y_true` and `y_pred` arrays.
    #[arg(long, conflicts_with_all = ["actual", "predicted"], required_unless_present = "actual")]
    input: Option<PathBuf>,

    /// Observed values, comma separated (e.g. "100,200,300").
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, requires = "predicted")]
    actual: Option<Vec<f64>>,

    /// Predicted values, comma separated.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, requires = "actual")]
    predicted: Option<Vec<f64>>,

    /// How MAPE treats zero observations. Overrides the configuration.
    #[arg(long, value_enum)]
    zero_policy: Option<ZeroPolicy>,
}

#[derive(Parser)]
struct EvaluateArgs {
    /// Stock document with the price history.
    #[arg(long)]
    history: PathBuf,

    /// Forecast document to score.
    #[arg(long)]
    forecast: PathBuf,

    /// How MAPE treats zero observations. Overrides the configuration.
    #[arg(long, value_enum)]
    zero_policy: Option<ZeroPolicy>,
}

#[derive(Parser)]
struct IndicatorsArgs {
    /// Stock document with the price history.
    #[arg(long)]
    stock: PathBuf,

    /// Indicators to compute. Repeat the flag or separate with commas. Defaults to all.
    #[arg(long = "indicator", value_enum, value_delimiter = ',')]
    indicators: Vec<Indicator>,

    /// Only show the last N rows.
    #[arg(long)]
    tail: Option<usize>,
}

#[derive(Parser)]
struct RiskArgs {
    /// Stock document with the price history.
    #[arg(long)]
    stock: PathBuf,

    /// Benchmark stock document used for beta and correlation.
    #[arg(long)]
    market: Option<PathBuf>,
}

#[derive(Parser)]
struct SearchArgs {
    /// JSON list of companies.
    #[arg(long)]
    companies: PathBuf,

    /// Text to look for in symbols and names.
    query: String,

    /// Maximum number of matches. Overrides the configuration.
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Parser)]
struct SectorsArgs {
    /// JSON list of companies.
    #[arg(long)]
    companies: PathBuf,

    /// Directory of `<SYMBOL>.json` stock documents used for sector performance.
    #[arg(long)]
    prices: Option<PathBuf>,
}

#[derive(Parser)]
struct TopArgs {
    /// JSON list of companies.
    #[arg(long)]
    companies: PathBuf,

    /// Directory of `<SYMBOL>.json` stock documents.
    #[arg(long)]
    prices: PathBuf,

    #[arg(long, value_enum, default_value_t = Timeframe::Daily)]
    timeframe: Timeframe,

    /// Number of companies to show. Overrides the configuration.
    #[arg(long)]
    limit: Option<usize>,
}

// ==============================================================================
// Forecast Accuracy Commands
// ==============================================================================

fn calculator(override_policy: Option<ZeroPolicy>, config: &Config) -> MetricsCalculator {
    MetricsCalculator::new(override_policy.unwrap_or(config.metrics.zero_policy))
}

fn handle_metrics(args: MetricsArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let (y_true, y_pred) = match (args.input, args.actual, args.predicted) {
        (Some(path), _, _) => {
            let series = input::load_series(&path)?;
            (series.y_true, series.y_pred)
        }
        (None, Some(actual), Some(predicted)) => (actual, predicted),
        _ => anyhow::bail!("Provide either --input or both --actual and --predicted"),
    };

    let calculator = calculator(args.zero_policy, config);
    let report = calculator
        .compute(&y_true, &y_pred)
        .context("Failed to compute accuracy metrics")?;
    tracing::info!(
        observations = report.observations,
        complete = report.is_complete(),
        "Computed accuracy metrics"
    );

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => {
            output::print_accuracy(&report);
            Ok(())
        }
    }
}

fn handle_evaluate(args: EvaluateArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let history = input::load_bars(&args.history)?;
    let forecast = input::load_forecast(&args.forecast)?;
    tracing::info!(
        history = history.len(),
        forecast = forecast.len(),
        "Evaluating forecast"
    );

    let evaluator = ForecastEvaluator::new(calculator(args.zero_policy, config));
    let evaluation = evaluator
        .evaluate(&history, &forecast)
        .context("Failed to evaluate forecast")?;

    match format {
        OutputFormat::Json => output::print_json(&evaluation),
        OutputFormat::Table => {
            output::print_evaluation(&evaluation);
            Ok(())
        }
    }
}

// ==============================================================================
// Stock Analysis Commands
// ==============================================================================

#[derive(Serialize)]
struct IndicatorOutput<'a> {
    rows: &'a [IndicatorRow],
    trend: Option<TrendAnalysis>,
    volatility: Option<VolatilityAnalysis>,
}

fn handle_indicators(args: IndicatorsArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let bars = input::load_bars(&args.stock)?;
    let engine = IndicatorEngine::new(config.indicators.clone())?;

    let selection = if args.indicators.is_empty() {
        Indicator::ALL.to_vec()
    } else {
        args.indicators
    };
    let rows = engine.compute(&bars, &selection)?;

    // The read-outs always use the full set, whatever was selected for display.
    let all_rows = engine.compute(&bars, &Indicator::ALL)?;
    let trend = TrendAnalysis::from_rows(&all_rows)
        .inspect_err(|e| tracing::warn!("Trend analysis unavailable: {}", e))
        .ok();
    let volatility = VolatilityAnalysis::from_rows(&all_rows)
        .inspect_err(|e| tracing::warn!("Volatility analysis unavailable: {}", e))
        .ok();

    let shown = match args.tail {
        Some(n) => &rows[rows.len().saturating_sub(n)..],
        None => &rows[..],
    };

    match format {
        OutputFormat::Json => output::print_json(&IndicatorOutput {
            rows: shown,
            trend,
            volatility,
        }),
        OutputFormat::Table => {
            println!("{}", output::indicator_table(shown));
            if let Some(trend) = &trend {
                output::print_trend(trend);
            }
            if let Some(volatility) = &volatility {
                output::print_volatility(volatility);
            }
            Ok(())
        }
    }
}

fn handle_risk(args: RiskArgs, format: OutputFormat) -> Result<()> {
    let bars = input::load_bars(&args.stock)?;
    let market = args.market.as_deref().map(input::load_bars).transpose()?;

    let report = RiskReport::from_bars(&bars, market.as_deref())
        .context("Failed to compute risk metrics")?;
    if market.is_some() && report.beta.is_none() {
        tracing::warn!("Market series does not overlap enough with the stock for beta");
    }

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => {
            println!("{}", output::risk_table(&report));
            Ok(())
        }
    }
}

// ==============================================================================
// Screener Commands
// ==============================================================================

fn handle_search(args: SearchArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let companies = input::load_companies(&args.companies)?;
    let screener = Screener::new(config.screener.clone());
    let hits = screener.search(&companies, &args.query, args.limit)?;
    tracing::info!(matches = hits.len(), query = %args.query, "Search complete");

    match format {
        OutputFormat::Json => output::print_json(&hits),
        OutputFormat::Table => {
            println!("{}", output::company_table(&hits));
            Ok(())
        }
    }
}

fn handle_sectors(args: SectorsArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let companies = input::load_companies(&args.companies)?;
    let prices = match &args.prices {
        Some(dir) => input::load_price_table(dir, &companies)?,
        None => PriceTable::new(),
    };

    let screener = Screener::new(config.screener.clone());
    let sectors = screener.sector_summary(&companies, &prices)?;

    match format {
        OutputFormat::Json => output::print_json(&sectors),
        OutputFormat::Table => {
            println!("{}", output::sector_table(&sectors));
            Ok(())
        }
    }
}

fn handle_top(args: TopArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let companies = input::load_companies(&args.companies)?;
    let prices = input::load_price_table(&args.prices, &companies)?;

    let screener = Screener::new(config.screener.clone());
    let performers = screener.top_performers(&companies, &prices, args.timeframe, args.limit)?;

    match format {
        OutputFormat::Json => output::print_json(&performers),
        OutputFormat::Table => {
            println!("{}", output::performer_table(&performers));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn metrics_accepts_inline_series() {
        let cli = Cli::try_parse_from([
            "foresight",
            "metrics",
            "--actual",
            "100,200,300",
            "--predicted",
            "110,190,310",
            "--zero-policy",
            "skip",
        ])
        .unwrap();

        let Commands::Metrics(args) = cli.command else {
            panic!("expected the metrics command");
        };
        assert_eq!(args.actual, Some(vec![100.0, 200.0, 300.0]));
        assert_eq!(args.predicted, Some(vec![110.0, 190.0, 310.0]));
        assert_eq!(args.zero_policy, Some(ZeroPolicy::Skip));
    }

    #[test]
    fn metrics_rejects_input_together_with_inline_series() {
        let parsed = Cli::try_parse_from([
            "foresight",
            "metrics",
            "--input",
            "series.json",
            "--actual",
            "1,2",
            "--predicted",
            "1,2",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "foresight",
            "top",
            "--companies",
            "companies.json",
            "--prices",
            "prices",
            "--timeframe",
            "weekly",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        let Commands::Top(args) = cli.command else {
            panic!("expected the top command");
        };
        assert_eq!(args.timeframe, Timeframe::Weekly);
        assert_eq!(args.limit, None);
    }

    #[test]
    fn indicators_can_be_listed_with_commas() {
        let cli = Cli::try_parse_from([
            "foresight",
            "indicators",
            "--stock",
            "AAPL.json",
            "--indicator",
            "sma-fast,rsi",
        ])
        .unwrap();

        let Commands::Indicators(args) = cli.command else {
            panic!("expected the indicators command");
        };
        assert_eq!(args.indicators, vec![Indicator::SmaFast, Indicator::Rsi]);
    }
}
