use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Indicator engine received invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    #[error("An error occurred during indicator calculation: {0}")]
    Calculation(String),
}
