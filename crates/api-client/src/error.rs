use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request to the data provider failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("The data provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),

    #[error("The data provider reported an error ({code}): {description}")]
    Provider { code: String, description: String },
}
