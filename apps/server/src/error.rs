//! Error types for the gene cluster engine and its HTTP surface

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Which request slot carried an unrecognised token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Search,
    Order,
    Direction,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Search => write!(f, "search field"),
            FieldKind::Order => write!(f, "order field"),
            FieldKind::Direction => write!(f, "order direction"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid {kind}: {value:?}")]
    InvalidField { kind: FieldKind, value: String },

    #[error("Query timed out: {operation} exceeded {}ms", .timeout.as_millis())]
    QueryTimeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("Malformed {relation} payload for cluster {cluster_id}: {source}")]
    HydrationDecode {
        cluster_id: String,
        relation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Ambiguous match: {0}")]
    Ambiguous(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn invalid_field(kind: FieldKind, value: impl Into<String>) -> Self {
        Error::InvalidField {
            kind,
            value: value.into(),
        }
    }

    /// Only deadline failures may be retried as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::QueryTimeout { .. })
    }

    /// Short machine-readable code used in API error bodies and metric labels.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Database(_) => "database",
            Error::InvalidField { .. } => "invalid-field",
            Error::QueryTimeout { .. } => "timeout",
            Error::HydrationDecode { .. } => "hydration-decode",
            Error::NotFound(_) => "not-found",
            Error::Ambiguous(_) => "ambiguous",
            Error::Validation(_) => "invalid",
            Error::Config(_) => "config",
            Error::Internal(_) | Error::Other(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Error::InvalidField { .. } | Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Ambiguous(_) => StatusCode::CONFLICT,
            Error::QueryTimeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Error::Database(_)
            | Error::HydrationDecode { .. }
            | Error::Config(_)
            | Error::Internal(_)
            | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, code = self.code(), "Internal error");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message,
                "retryable": self.is_retryable(),
            }
        }));

        let mut response = (status, body).into_response();

        if let Error::QueryTimeout { timeout, .. } = &self {
            let secs = timeout.as_secs().max(1);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}
