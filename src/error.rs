// file: src/error.rs
// description: Custom error types, result alias and http status mapping
// reference: https://docs.rs/thiserror

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AskemError>;

#[derive(Error, Debug)]
pub enum AskemError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned status {status}: {message}")]
    Upstream {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("Query failed: {0}")]
    Query(serde_json::Value),

    #[error("No results found: {0}")]
    NoResults(String),

    #[error("Invalid response from {service}: {message}")]
    InvalidResponse {
        service: &'static str,
        message: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid request body: {message}")]
    InvalidBody { status: u16, message: String },

    #[error("Model error: {0}")]
    Model(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AskemError {
    pub fn invalid_response(service: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            service,
            message: message.into(),
        }
    }

    /// Status code used when the error is returned from the HTTP API.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AskemError::NoResults(_) => StatusCode::NOT_FOUND,
            AskemError::Validation(_) => StatusCode::BAD_REQUEST,
            AskemError::InvalidBody { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
            }
            AskemError::Upstream { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            AskemError::Http(_) | AskemError::InvalidResponse { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> serde_json::Value {
        match self {
            AskemError::Query(errors) => errors.clone(),
            other => json!(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AskemError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody {
            status: rejection.status().as_u16(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for AskemError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AskemError::NoResults("empty".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AskemError::Query(json!([{"message": "bad"}])).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AskemError::Validation("top_k".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_upstream_status_forwarded() {
        let err = AskemError::Upstream {
            service: "weaviate",
            status: 401,
            message: "unauthorized".into(),
        };
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let err = AskemError::Upstream {
            service: "weaviate",
            status: 302,
            message: "redirect".into(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_invalid_body_keeps_rejection_status() {
        let err = AskemError::InvalidBody {
            status: 422,
            message: "missing field `question`".into(),
        };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            err.detail(),
            json!("Invalid request body: missing field `question`")
        );
    }

    #[test]
    fn test_query_detail_keeps_errors() {
        let errors = json!([{"message": "class not found"}]);
        assert_eq!(AskemError::Query(errors.clone()).detail(), errors);
    }
}
