use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScreenerError {
    #[error("The company universe is empty")]
    EmptyUniverse,

    #[error("No company in the universe has enough price history for the {0} timeframe")]
    NoPriceData(core_types::Timeframe),
}
