//! Error types and handling for the `tenki` service

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the `tenki` service
#[derive(Error, Debug)]
pub enum TenkiError {
    /// Malformed or missing request input. Never reaches an external service.
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// The romaji converter is still loading its dictionary
    #[error("Converter not ready")]
    ServiceNotReady,

    /// The romaji converter failed to initialize at startup
    #[error("Converter initialization failed: {reason}")]
    InitializationFailure { reason: String },

    /// Timeout, network failure, rejected redirect or non-success status upstream
    #[error("Upstream connection error: {message}")]
    UpstreamConnection { message: String },

    /// Upstream answered with a body that does not match the expected shape
    #[error("Upstream response error: {message}")]
    UpstreamShape { message: String },

    /// No geocoding match, even after the prefecture fallback
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Unexpected failure while converting text to romaji
    #[error("Conversion error: {message}")]
    Conversion { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl TenkiError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn initialization_failure<S: Into<String>>(reason: S) -> Self {
        Self::InitializationFailure {
            reason: reason.into(),
        }
    }

    pub fn upstream_connection<S: Into<String>>(message: S) -> Self {
        Self::UpstreamConnection {
            message: message.into(),
        }
    }

    pub fn upstream_shape<S: Into<String>>(message: S) -> Self {
        Self::UpstreamShape {
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conversion<S: Into<String>>(message: S) -> Self {
        Self::Conversion {
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// HTTP status this error maps to at the request boundary
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            TenkiError::Validation { .. } => StatusCode::BAD_REQUEST,
            TenkiError::ServiceNotReady => StatusCode::SERVICE_UNAVAILABLE,
            TenkiError::NotFound { .. } => StatusCode::NOT_FOUND,
            TenkiError::UpstreamConnection { .. } | TenkiError::UpstreamShape { .. } => {
                StatusCode::BAD_GATEWAY
            }
            TenkiError::InitializationFailure { .. }
            | TenkiError::Conversion { .. }
            | TenkiError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message.
    ///
    /// Upstream and validation messages are already written for end users.
    /// Internal causes are replaced by a fixed text.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TenkiError::Validation { message }
            | TenkiError::UpstreamConnection { message }
            | TenkiError::UpstreamShape { message }
            | TenkiError::NotFound { message } => message.clone(),
            TenkiError::ServiceNotReady => "Converter not ready".to_string(),
            TenkiError::InitializationFailure { .. } => {
                "Converter initialization failed".to_string()
            }
            TenkiError::Conversion { .. } => "Conversion failed".to_string(),
            TenkiError::Config { .. } => "Internal server error".to_string(),
        }
    }
}

/// Uniform failure body shared by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub message: String,
}

impl IntoResponse for TenkiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), "Request failed: {}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "Request rejected: {}", self);
        }
        let body = ErrorBody {
            ok: false,
            message: self.user_message(),
        };
        (status, Json(body)).into_response()
    }
}
