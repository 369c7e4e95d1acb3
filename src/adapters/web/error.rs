//! HTTP error responses for the REST transport.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::error::ScreenerError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

pub fn status_from_error(err: &ScreenerError) -> StatusCode {
    match err {
        ScreenerError::UnknownPredicate { .. }
        | ScreenerError::UnknownPattern { .. }
        | ScreenerError::InvalidInterval { .. }
        | ScreenerError::InvalidChain { .. }
        | ScreenerError::ConfigMissing { .. }
        | ScreenerError::ConfigInvalid { .. }
        | ScreenerError::ConfigParse { .. } => StatusCode::BAD_REQUEST,
        ScreenerError::DataMalformed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ScreenerError::Storage { .. } | ScreenerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ScreenerError> for WebError {
    fn from(err: ScreenerError) -> Self {
        Self::new(status_from_error(&err), err.to_string())
    }
}

impl From<tokio::task::JoinError> for WebError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(format!("worker task failed: {}", err))
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_errors_are_client_errors() {
        let err = ScreenerError::UnknownPredicate {
            name: "nonexistent_predicate".into(),
        };
        assert_eq!(WebError::from(err).status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn malformed_data_is_unprocessable() {
        let err = ScreenerError::DataMalformed {
            path: "1d/1d-X.csv".into(),
            reason: "missing Close column".into(),
        };
        assert_eq!(status_from_error(&err), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn storage_errors_are_server_errors() {
        let err = ScreenerError::Storage {
            reason: "disk full".into(),
        };
        let web = WebError::from(err);
        assert_eq!(web.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(web.message, "storage error: disk full");
    }
}
