//! Domain-specific error types for host-summary

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Main error type for the host summary service
#[derive(Error, Debug)]
pub enum HostSummaryError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Dataset not found")]
    DatasetNotFound,

    #[error("Dataset error: {message}")]
    Dataset { message: String },

    #[error("IP address is required")]
    MissingIp,

    #[error("Host not found in dataset")]
    HostNotFound,

    #[error("Generation error: {message}")]
    Generation { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl HostSummaryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            HostSummaryError::MissingIp => StatusCode::BAD_REQUEST,
            HostSummaryError::DatasetNotFound | HostSummaryError::HostNotFound => {
                StatusCode::NOT_FOUND
            }
            HostSummaryError::Config { .. }
            | HostSummaryError::Dataset { .. }
            | HostSummaryError::Generation { .. }
            | HostSummaryError::Serialization { .. }
            | HostSummaryError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the `error` field of the response body.
    /// Generation failures are passed through without the variant label.
    pub fn client_message(&self) -> String {
        match self {
            HostSummaryError::Generation { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for HostSummaryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(json!({ "error": self.client_message() }))).into_response()
    }
}

impl From<anyhow::Error> for HostSummaryError {
    fn from(err: anyhow::Error) -> Self {
        HostSummaryError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for HostSummaryError {
    fn from(err: serde_json::Error) -> Self {
        HostSummaryError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for HostSummaryError {
    fn from(err: reqwest::Error) -> Self {
        HostSummaryError::Generation {
            message: format!("HTTP request failed: {}", err),
        }
    }
}

/// Result type alias for host-summary operations
pub type Result<T> = std::result::Result<T, HostSummaryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_taxonomy() {
        assert_eq!(
            HostSummaryError::MissingIp.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HostSummaryError::DatasetNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HostSummaryError::HostNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HostSummaryError::Generation {
                message: "quota".into()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn generation_message_is_verbatim() {
        let err = HostSummaryError::Generation {
            message: "You exceeded your current quota".into(),
        };
        assert_eq!(err.client_message(), "You exceeded your current quota");
        assert_eq!(
            HostSummaryError::HostNotFound.client_message(),
            "Host not found in dataset"
        );
    }
}
