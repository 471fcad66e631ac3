use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("No price data was returned for the requested instrument")]
    NoData,

    #[error("Not enough data to perform calculation: {required} price points required, {actual} available")]
    InsufficientHistory { required: usize, actual: usize },

    #[error("Calculation error: {0}")]
    Computation(String),

    #[error("Upstream data provider failed: {0}")]
    UpstreamFailure(String),
}

impl AnalyticsError {
    /// A stable, machine-readable name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyticsError::NoData => "no_data",
            AnalyticsError::InsufficientHistory { .. } => "insufficient_history",
            AnalyticsError::Computation(_) => "computation_error",
            AnalyticsError::UpstreamFailure(_) => "upstream_failure",
        }
    }
}
