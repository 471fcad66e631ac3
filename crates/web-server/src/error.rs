use analytics::AnalyticsError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use core_types::CoreError;
use serde_json::json;
use thiserror::Error;

const INVALID_REQUEST: &str = "invalid_request";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    Validation(#[from] CoreError),
    #[error("Invalid request body: {0}")]
    Body(#[from] JsonRejection),
    #[error("Invalid query string: {0}")]
    Query(#[from] QueryRejection),
    #[error(transparent)]
    Analysis(#[from] AnalyticsError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Body(_) | AppError::Query(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Analysis(e) => match e {
                AnalyticsError::NoData => StatusCode::NOT_FOUND,
                AnalyticsError::InsufficientHistory { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                AnalyticsError::Computation(_) => StatusCode::INTERNAL_SERVER_ERROR,
                AnalyticsError::UpstreamFailure(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Analysis(e) => e.kind(),
            _ => INVALID_REQUEST,
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Analysis request failed.");
        } else {
            tracing::warn!(error = %self, "Analysis request rejected.");
        }

        let body = Json(json!({ "error": self.to_string(), "kind": self.kind() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_kind_has_its_own_status() {
        let cases = [
            (AppError::from(AnalyticsError::NoData), StatusCode::NOT_FOUND),
            (
                AppError::from(AnalyticsError::InsufficientHistory { required: 2, actual: 1 }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::from(AnalyticsError::Computation("nan".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::from(AnalyticsError::UpstreamFailure("timeout".to_string())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::from(CoreError::InvalidInput("ticker".into(), "empty".into())),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.status(), status, "{}", error);
        }
    }

    #[test]
    fn validation_errors_share_one_kind() {
        let error = AppError::from(CoreError::InvalidInput("ticker".into(), "empty".into()));
        assert_eq!(error.kind(), "invalid_request");
        assert_eq!(AppError::from(AnalyticsError::NoData).kind(), "no_data");
    }
}
