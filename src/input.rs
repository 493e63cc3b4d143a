use anyhow::{Context, Result};
use core_types::{Company, ForecastDocument, ForecastPoint, PriceBar, StockDocument};
use indicatif::{ProgressBar, ProgressStyle};
use screener::PriceTable;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// A pair of observed and predicted series stored side by side.
#[derive(Debug, Deserialize)]
pub struct SeriesInput {
    #[serde(alias = "actual")]
    pub y_true: Vec<f64>,
    #[serde(alias = "predicted")]
    pub y_pred: Vec<f64>,
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_series(path: &Path) -> Result<SeriesInput> {
    load_json(path)
}

/// Loads a stock document and returns its bars in date order.
pub fn load_bars(path: &Path) -> Result<Vec<PriceBar>> {
    let doc: StockDocument = load_json(path)?;
    doc.into_sorted_bars()
        .with_context(|| format!("Invalid price data in {}", path.display()))
}

pub fn load_forecast(path: &Path) -> Result<Vec<ForecastPoint>> {
    let doc: ForecastDocument = load_json(path)?;
    Ok(doc.into_points())
}

pub fn load_companies(path: &Path) -> Result<Vec<Company>> {
    load_json(path)
}

/// Loads `<dir>/<SYMBOL>.json` for every company in the universe.
///
/// Symbols without a file are skipped. Files that fail to parse are logged and skipped.
pub fn load_price_table(dir: &Path, companies: &[Company]) -> Result<PriceTable> {
    if !dir.is_dir() {
        anyhow::bail!("Price directory {} does not exist", dir.display());
    }

    let progress_bar = ProgressBar::new(companies.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut table = PriceTable::new();
    for company in companies {
        progress_bar.set_message(company.symbol.clone());
        let path = dir.join(format!("{}.json", company.symbol));

        if path.is_file() {
            match load_bars(&path) {
                Ok(bars) => {
                    table.insert(company.symbol.clone(), bars);
                }
                Err(e) => tracing::warn!(symbol = %company.symbol, error = %format!("{e:#}"), "Skipping unreadable price file"),
            }
        } else {
            tracing::debug!(symbol = %company.symbol, "No price file");
        }
        progress_bar.inc(1);
    }

    progress_bar.finish_and_clear();
    tracing::info!(
        loaded = table.len(),
        universe = companies.len(),
        "Loaded price history from {}",
        dir.display()
    );
    Ok(table)
}
