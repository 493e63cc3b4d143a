use analytics::{AccuracyReport, ForecastEvaluation, MetricResult, RiskReport};
use anyhow::Result;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use core_types::Company;
use indicators::{IndicatorRow, TrendAnalysis, VolatilityAnalysis};
use screener::{Performer, SectorSummary};
use serde::Serialize;
use std::collections::BTreeMap;

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

fn metric_cell(result: &MetricResult, decimals: usize) -> String {
    match result {
        Ok(value) => format!("{value:.decimals$}"),
        Err(_) => "N/A".to_string(),
    }
}

fn optional_cell(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.decimals$}"))
}

fn signed_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:+.2}%"))
}

// ==============================================================================
// Accuracy
// ==============================================================================

pub fn accuracy_table(report: &AccuracyReport) -> Table {
    let mut table = new_table(&["Metric", "Value"]);
    table.add_row(vec!["Observations".to_string(), report.observations.to_string()]);
    table.add_row(vec!["MAPE (%)".to_string(), metric_cell(&report.mape, 4)]);
    if report.mape_points != report.observations {
        table.add_row(vec!["MAPE points".to_string(), report.mape_points.to_string()]);
    }
    table.add_row(vec!["RMSE".to_string(), metric_cell(&report.rmse, 4)]);
    table.add_row(vec!["R²".to_string(), metric_cell(&report.r2, 4)]);
    table
}

/// Lines explaining every `N/A` in an accuracy table.
pub fn failure_notes(report: &AccuracyReport) -> Vec<String> {
    report
        .failures()
        .into_iter()
        .map(|(kind, err)| format!("{kind}: {err}"))
        .collect()
}

pub fn print_accuracy(report: &AccuracyReport) {
    println!("{}", accuracy_table(report));
    for note in failure_notes(report) {
        println!("  {note}");
    }
}

pub fn print_evaluation(evaluation: &ForecastEvaluation) {
    let window = &evaluation.window;
    let mut table = new_table(&["Window", "Value"]);
    table.add_row(vec!["Start".to_string(), window.start.to_string()]);
    table.add_row(vec!["End".to_string(), window.end.to_string()]);
    table.add_row(vec!["History points".to_string(), window.history_points.to_string()]);
    table.add_row(vec!["Forecast points".to_string(), window.forecast_points.to_string()]);
    table.add_row(vec!["Matched points".to_string(), window.matched_points.to_string()]);
    table.add_row(vec!["Future points".to_string(), window.future_points.to_string()]);
    table.add_row(vec![
        "Directional accuracy (%)".to_string(),
        metric_cell(&evaluation.directional_accuracy, 2),
    ]);
    println!("{table}");

    print_accuracy(&evaluation.accuracy);
    if let Err(err) = &evaluation.directional_accuracy {
        println!("  directional_accuracy: {err}");
    }
}

// ==============================================================================
// Indicators & Risk
// ==============================================================================

pub fn indicator_table(rows: &[IndicatorRow]) -> Table {
    let mut table = new_table(&[
        "Date", "Close", "SMA fast", "SMA slow", "RSI", "MACD", "Signal", "Hist", "BB upper",
        "BB middle", "BB lower", "Volatility",
    ]);
    for row in rows {
        table.add_row(vec![
            row.date.to_string(),
            format!("{:.2}", row.close),
            optional_cell(row.sma_fast, 2),
            optional_cell(row.sma_slow, 2),
            optional_cell(row.rsi, 2),
            optional_cell(row.macd, 4),
            optional_cell(row.macd_signal, 4),
            optional_cell(row.macd_histogram, 4),
            optional_cell(row.bb_upper, 2),
            optional_cell(row.bb_middle, 2),
            optional_cell(row.bb_lower, 2),
            optional_cell(row.volatility, 4),
        ]);
    }
    table
}

pub fn print_trend(trend: &TrendAnalysis) {
    let mut table = new_table(&["Trend", "Value"]);
    table.add_row(vec!["Status".to_string(), trend.status.to_string()]);
    table.add_row(vec!["Price".to_string(), format!("{:.2}", trend.price)]);
    table.add_row(vec!["SMA fast".to_string(), format!("{:.2}", trend.sma_fast)]);
    table.add_row(vec!["SMA slow".to_string(), format!("{:.2}", trend.sma_slow)]);
    table.add_row(vec![
        "Price vs SMA fast".to_string(),
        signed_pct(Some(trend.price_vs_sma_fast_pct)),
    ]);
    table.add_row(vec![
        "SMA fast vs SMA slow".to_string(),
        signed_pct(Some(trend.sma_fast_vs_sma_slow_pct)),
    ]);
    println!("{table}");
}

pub fn print_volatility(volatility: &VolatilityAnalysis) {
    let mut table = new_table(&["Volatility", "Value"]);
    table.add_row(vec!["Current".to_string(), format!("{:.4}", volatility.current)]);
    table.add_row(vec!["Average".to_string(), format!("{:.4}", volatility.average)]);
    table.add_row(vec!["Ratio".to_string(), optional_cell(volatility.ratio, 2)]);
    table.add_row(vec!["Percentile".to_string(), format!("{:.1}", volatility.percentile)]);
    println!("{table}");
}

pub fn risk_table(report: &RiskReport) -> Table {
    let mut table = new_table(&["Risk", "Value"]);
    table.add_row(vec!["Max drawdown".to_string(), signed_pct(Some(report.max_drawdown_pct))]);
    table.add_row(vec![
        "Current drawdown".to_string(),
        signed_pct(Some(report.current_drawdown_pct)),
    ]);
    table.add_row(vec!["VaR 95%".to_string(), signed_pct(Some(report.var_95_pct))]);
    table.add_row(vec!["VaR 99%".to_string(), signed_pct(Some(report.var_99_pct))]);
    table.add_row(vec!["Beta".to_string(), optional_cell(report.beta, 3)]);
    table.add_row(vec![
        "Market correlation".to_string(),
        optional_cell(report.market_correlation, 3),
    ]);
    table
}

// ==============================================================================
// Screener
// ==============================================================================

pub fn company_table(companies: &[&Company]) -> Table {
    let mut table = new_table(&["Symbol", "Name", "Sector", "Sub-industry"]);
    for company in companies {
        table.add_row(vec![
            company.symbol.clone(),
            company.name.clone(),
            company.sector.clone(),
            company.sub_industry.clone(),
        ]);
    }
    table
}

pub fn sector_table(sectors: &BTreeMap<String, SectorSummary>) -> Table {
    let mut table = new_table(&["Sector", "Companies", "Daily", "Weekly", "Monthly", "Yearly"]);
    for (sector, summary) in sectors {
        let perf = &summary.performance;
        table.add_row(vec![
            sector.clone(),
            summary.count.to_string(),
            signed_pct(perf.daily),
            signed_pct(perf.weekly),
            signed_pct(perf.monthly),
            signed_pct(perf.yearly),
        ]);
    }
    table
}

pub fn performer_table(performers: &[Performer]) -> Table {
    let mut table = new_table(&["#", "Symbol", "Name", "Sector", "Price", "Change"]);
    for (rank, performer) in performers.iter().enumerate() {
        table.add_row(vec![
            (rank + 1).to_string(),
            performer.symbol.clone(),
            performer.name.clone(),
            performer.sector.clone(),
            format!("{:.2}", performer.price),
            signed_pct(Some(performer.change_pct)),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::MetricError;

    fn report() -> AccuracyReport {
        AccuracyReport {
            observations: 3,
            mape_points: 3,
            mape: Err(MetricError::ZeroObservation { index: 1 }),
            rmse: Ok(1.0),
            r2: Ok(0.5),
        }
    }

    #[test]
    fn failed_metrics_render_as_na_with_a_reason() {
        let rendered = accuracy_table(&report()).to_string();
        assert!(rendered.contains("N/A"));
        assert!(rendered.contains("1.0000"));

        let notes = failure_notes(&report());
        assert_eq!(notes.len(), 1);
        assert!(notes[0].starts_with("mape:"));
        assert!(notes[0].contains("index 1"));
    }

    #[test]
    fn failed_metrics_serialize_as_err() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["rmse"]["Ok"], 1.0);
        assert_eq!(json["mape"]["Err"]["ZeroObservation"]["index"], 1);
    }

    #[test]
    fn missing_values_render_as_dashes() {
        assert_eq!(optional_cell(None, 2), "-");
        assert_eq!(signed_pct(Some(2.5)), "+2.50%");
        assert_eq!(signed_pct(Some(-1.0)), "-1.00%");
    }
}
