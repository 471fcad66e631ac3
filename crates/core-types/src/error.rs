use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Price series is not strictly increasing by date at {0}")]
    UnorderedSeries(NaiveDate),

    #[error("Price series has a non-positive or non-finite close on {0}")]
    InvalidClose(NaiveDate),
}
