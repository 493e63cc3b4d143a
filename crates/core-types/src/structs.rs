use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of OHLCV data.
///
/// Field names follow the price API (`Date`, `Close`, ...). Only `Date` and
/// `Close` are required; the remaining columns default to zero when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    #[serde(rename = "Date", alias = "date", deserialize_with = "crate::date_format::deserialize")]
    pub date: NaiveDate,
    #[serde(rename = "Open", alias = "open", default)]
    pub open: f64,
    #[serde(rename = "High", alias = "high", default)]
    pub high: f64,
    #[serde(rename = "Low", alias = "low", default)]
    pub low: f64,
    #[serde(rename = "Close", alias = "close")]
    pub close: f64,
    #[serde(rename = "Volume", alias = "volume", default)]
    pub volume: f64,
}

/// Descriptive fields for a single listed company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    #[serde(default)]
    pub fifty_two_week_low: Option<f64>,
    #[serde(default)]
    pub fifty_two_week_high: Option<f64>,
}

/// A stock lookup result: the price history plus the company description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockDocument {
    pub data: Vec<PriceBar>,
    #[serde(default)]
    pub info: Option<CompanyInfo>,
}

impl StockDocument {
    /// Returns the bars sorted by date, rejecting non-finite closes.
    pub fn into_sorted_bars(self) -> Result<Vec<PriceBar>, CoreError> {
        let mut bars = self.data;
        if let Some(bad) = bars.iter().find(|b| !b.close.is_finite()) {
            return Err(CoreError::InvalidInput(
                "Close".to_string(),
                format!("non-finite value {} on {}", bad.close, bad.date),
            ));
        }
        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

/// A single forecast step: the point prediction and its confidence band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    #[serde(rename = "ds", alias = "date", deserialize_with = "crate::date_format::deserialize")]
    pub date: NaiveDate,
    #[serde(rename = "yhat", alias = "predicted_price")]
    pub predicted: f64,
    #[serde(rename = "yhat_lower", alias = "lower_bound")]
    pub lower_bound: f64,
    #[serde(rename = "yhat_upper", alias = "upper_bound")]
    pub upper_bound: f64,
}

/// Forecast output as delivered by the forecast endpoint.
///
/// Both a bare list of points and the `{ "forecast": [...], "metrics": {...} }`
/// envelope are accepted. The envelope's metrics are ignored; they are recomputed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ForecastDocument {
    Envelope { forecast: Vec<ForecastPoint> },
    Points(Vec<ForecastPoint>),
}

impl ForecastDocument {
    pub fn into_points(self) -> Vec<ForecastPoint> {
        match self {
            ForecastDocument::Envelope { forecast } => forecast,
            ForecastDocument::Points(points) => points,
        }
    }
}

/// A member of the company universe used for search and screening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    #[serde(default)]
    pub sub_industry: String,
}

/// Extracts the closing prices of a bar series, in order.
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_bars_accept_api_field_names() {
        let json = r#"{
            "data": [
                {"Date": "2024-01-03T00:00:00", "Open": 1.0, "High": 2.0, "Low": 0.5, "Close": 1.5, "Volume": 1000},
                {"Date": "2024-01-02", "Close": 1.2}
            ],
            "info": {"name": "Apple Inc.", "sector": "Technology"}
        }"#;
        let doc: StockDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.info.as_ref().unwrap().sector.as_deref(), Some("Technology"));

        let bars = doc.into_sorted_bars().unwrap();
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[0].volume, 0.0);
        assert_eq!(closes(&bars), vec![1.2, 1.5]);
    }

    #[test]
    fn forecast_document_accepts_both_shapes() {
        let bare = r#"[{"ds": "2024-01-02", "yhat": 10.0, "yhat_lower": 9.0, "yhat_upper": 11.0}]"#;
        let wrapped = r#"{
            "forecast": [{"ds": "2024-01-02T00:00:00", "yhat": 10.0, "yhat_lower": 9.0, "yhat_upper": 11.0}],
            "metrics": {"mape": 0.1}
        }"#;

        let a: ForecastDocument = serde_json::from_str(bare).unwrap();
        let b: ForecastDocument = serde_json::from_str(wrapped).unwrap();
        assert_eq!(a.into_points(), b.into_points());
    }

    #[test]
    fn forecast_point_accepts_model_field_names() {
        let json = r#"{"date": "2024-01-02", "predicted_price": 10.0, "lower_bound": 9.0, "upper_bound": 11.0}"#;
        let point: ForecastPoint = serde_json::from_str(json).unwrap();
        assert_eq!(point.predicted, 10.0);
        assert_eq!(point.upper_bound, 11.0);
    }

    #[test]
    fn bad_dates_fail_deserialization() {
        let json = r#"{"data": [{"Date": "yesterday", "Close": 1.0}]}"#;
        assert!(serde_json::from_str::<StockDocument>(json).is_err());
    }
}
