use crate::error::ScreenerError;
use configuration::ScreenerSettings;
use core_types::{Company, PriceBar, Timeframe};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

pub mod change;
pub mod error;

pub use change::price_change;

/// Price history per symbol, each series in chronological order.
pub type PriceTable = HashMap<String, Vec<PriceBar>>;

/// A company ranked by its price change over a timeframe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Performer {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub change_pct: f64,
    pub price: f64,
}

/// Mean price change of a sector's members, per timeframe.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SectorPerformance {
    pub daily: Option<f64>,
    pub weekly: Option<f64>,
    pub monthly: Option<f64>,
    pub yearly: Option<f64>,
}

impl SectorPerformance {
    pub fn get(&self, timeframe: Timeframe) -> Option<f64> {
        match timeframe {
            Timeframe::Daily => self.daily,
            Timeframe::Weekly => self.weekly,
            Timeframe::Monthly => self.monthly,
            Timeframe::Yearly => self.yearly,
        }
    }

    fn set(&mut self, timeframe: Timeframe, value: Option<f64>) {
        let slot = match timeframe {
            Timeframe::Daily => &mut self.daily,
            Timeframe::Weekly => &mut self.weekly,
            Timeframe::Monthly => &mut self.monthly,
            Timeframe::Yearly => &mut self.yearly,
        };
        *slot = value;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorSummary {
    pub count: usize,
    pub companies: Vec<String>,
    pub performance: SectorPerformance,
}

/// Searches, groups and ranks a company universe.
pub struct Screener {
    settings: ScreenerSettings,
}

impl Screener {
    pub fn new(settings: ScreenerSettings) -> Self {
        Self { settings }
    }

    /// Case-insensitive substring match on symbol or name, in universe order.
    ///
    /// `limit` overrides the configured search limit.
    pub fn search<'a>(
        &self,
        companies: &'a [Company],
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<&'a Company>, ScreenerError> {
        if companies.is_empty() {
            return Err(ScreenerError::EmptyUniverse);
        }

        let needle = query.trim().to_uppercase();
        if needle.is_empty() {
            return Ok(vec![]);
        }

        let limit = limit.unwrap_or(self.settings.search_limit);
        Ok(companies
            .iter()
            .filter(|c| {
                c.symbol.to_uppercase().contains(&needle) || c.name.to_uppercase().contains(&needle)
            })
            .take(limit)
            .collect())
    }

    /// Groups the universe by sector, with the mean price change of each sector.
    pub fn sector_summary(
        &self,
        companies: &[Company],
        prices: &PriceTable,
    ) -> Result<BTreeMap<String, SectorSummary>, ScreenerError> {
        if companies.is_empty() {
            return Err(ScreenerError::EmptyUniverse);
        }

        let mut members: BTreeMap<&str, Vec<&Company>> = BTreeMap::new();
        for company in companies {
            members.entry(company.sector.as_str()).or_default().push(company);
        }

        let summaries = members
            .into_iter()
            .map(|(sector, companies)| {
                let mut performance = SectorPerformance::default();
                for timeframe in Timeframe::ALL {
                    let changes: Vec<f64> = companies
                        .iter()
                        .filter_map(|c| prices.get(&c.symbol))
                        .filter_map(|bars| price_change(bars, timeframe))
                        .collect();
                    performance.set(timeframe, mean(&changes));
                }

                let summary = SectorSummary {
                    count: companies.len(),
                    companies: companies.iter().map(|c| c.symbol.clone()).collect(),
                    performance,
                };
                (sector.to_string(), summary)
            })
            .collect();

        Ok(summaries)
    }

    /// Ranks companies by price change over `timeframe`, best first.
    ///
    /// Companies without enough history are left out. `limit` overrides the
    /// configured ranking length.
    pub fn top_performers(
        &self,
        companies: &[Company],
        prices: &PriceTable,
        timeframe: Timeframe,
        limit: Option<usize>,
    ) -> Result<Vec<Performer>, ScreenerError> {
        if companies.is_empty() {
            return Err(ScreenerError::EmptyUniverse);
        }

        // 1. Measure
        let mut performers: Vec<Performer> = companies
            .iter()
            .filter_map(|company| {
                let bars = prices.get(&company.symbol)?;
                let change_pct = price_change(bars, timeframe)?;
                let price = bars.last()?.close;
                Some(Performer {
                    symbol: company.symbol.clone(),
                    name: company.name.clone(),
                    sector: company.sector.clone(),
                    change_pct,
                    price,
                })
            })
            .collect();

        if performers.is_empty() {
            return Err(ScreenerError::NoPriceData(timeframe));
        }
        tracing::debug!(
            ranked = performers.len(),
            universe = companies.len(),
            %timeframe,
            "Ranking performers"
        );

        // 2. Rank
        performers.sort_by(|a, b| {
            b.change_pct
                .partial_cmp(&a.change_pct)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });

        // 3. Truncate
        performers.truncate(limit.unwrap_or(self.settings.top_performers_limit));
        Ok(performers)
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
