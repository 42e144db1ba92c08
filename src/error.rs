// src/error.rs
//! Error types for the registry core, the HTTP service and the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::message::ErrorResponse;
use crate::registry::RecordId;

/// Failure modes of a registry operation. None of these are fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),
}

/// Stable, wire-visible classification of a [`RegistryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Internal,
}

impl RegistryError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NotFound(_) => ErrorKind::NotFound,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::InvalidInput => "invalid_input",
            Self::NotFound => "not_found",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Errors surfaced by the service process and its HTTP handlers.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Registry(e) => e.kind(),
            Self::Config(_) | Self::Io(_) => ErrorKind::Internal,
        }
    }

    pub const fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Registry errors are caller mistakes and safe to echo back.
        let message = match &self {
            Self::Registry(e) => e.to_string(),
            Self::Config(_) | Self::Io(_) => "internal server error".to_owned(),
        };

        let body = ErrorResponse {
            error: self.kind(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

/// Errors returned by [`crate::client::RegistryClient`].
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("registry rejected request ({kind}): {message}")]
    Registry { kind: ErrorKind, message: String },

    #[error("unexpected status: {0}")]
    UnexpectedStatus(u16),

    #[error("already registered as id {0}")]
    AlreadyRegistered(RecordId),

    #[error("not registered")]
    NotRegistered,
}

impl ClientError {
    /// True when the server reported that the name or id does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Registry {
                kind: ErrorKind::NotFound,
                ..
            }
        )
    }
}

pub type Result<T, E = RegistryError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            ServiceError::from(RegistryError::NotFound("ghost".into())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::from(RegistryError::InvalidInput("name".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Config("bad".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&ErrorKind::NotFound).unwrap(),
            "\"not_found\""
        );
        assert_eq!(ErrorKind::InvalidInput.to_string(), "invalid_input");
    }

    #[test]
    fn client_not_found() {
        let err = ClientError::Registry {
            kind: ErrorKind::NotFound,
            message: "not found: ghost".into(),
        };
        assert!(err.is_not_found());
        assert!(!ClientError::UnexpectedStatus(502).is_not_found());
    }
}
