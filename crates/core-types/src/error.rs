use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Invalid date '{0}': expected YYYY-MM-DD or an ISO 8601 date-time")]
    InvalidDate(String),
}
