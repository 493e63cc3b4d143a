//! Shared data types for the Foresight workspace.
//!
//! Every other crate speaks in these types: price bars and forecast points
//! coming in from JSON documents, the company universe used by the screener,
//! and the small enums that select policies and timeframes.

pub mod date_format;
pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Indicator, Timeframe, TrendStatus, ZeroPolicy};
pub use error::CoreError;
pub use structs::{
    closes, Company, CompanyInfo, ForecastDocument, ForecastPoint, PriceBar, StockDocument,
};
