use std::path::PathBuf;

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("database is in read-only mode")]
    ReadOnly,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Query(String),

    #[error("failed to open database: {path}: {source}")]
    DbOpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Query(e.to_string())
    }
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::ReadOnly => "READ_ONLY",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Query(_) => "QUERY_ERROR",
            AppError::DbOpenFailed { .. } => "DB_OPEN_FAILED",
            AppError::Io(_) => "IO_ERROR",
            AppError::Internal(_) => "INTERNAL",
        }
    }

    /// Status used by the HTTP adapter unless an endpoint overrides it.
    /// Only caller mistakes are 4xx; every data-layer failure, read-only
    /// violations included, is a 500.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            AppError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::ReadOnly.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            AppError::NotFound("no such table: t".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Query("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn readonly_message_is_stable() {
        assert_eq!(AppError::ReadOnly.to_string(), "database is in read-only mode");
        assert_eq!(AppError::ReadOnly.code(), "READ_ONLY");
    }

    #[test]
    fn engine_errors_become_query_errors() {
        let e: AppError = rusqlite::Error::InvalidQuery.into();
        assert_eq!(e.code(), "QUERY_ERROR");
    }
}
