use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

// Query strings are decoded leniently: every field is an optional string and
// the handler decides what a bad value means.

#[derive(Debug, Default, Deserialize)]
pub struct TablesParams {
    #[serde(default)]
    pub columns: Option<String>,
}

impl TablesParams {
    pub fn with_columns(&self) -> bool {
        matches!(self.columns.as_deref(), Some("true" | "1"))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PkParams {
    #[serde(default)]
    pub pk: Option<String>,
    #[serde(default)]
    pub pk_value: Option<String>,
}

impl PkParams {
    /// Both parameters must be present and non-empty.
    pub fn require(self) -> AppResult<(String, String)> {
        match (self.pk, self.pk_value) {
            (Some(pk), Some(v)) if !pk.is_empty() && !v.is_empty() => Ok((pk, v)),
            _ => Err(AppError::Validation(
                "Missing pk or pk_value query parameters".into(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub sql: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModeResponse {
    pub readonly: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

/// An `AppError` paired with the status it is reported under.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: AppError,
}

impl ApiError {
    pub fn bad_request(error: AppError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self {
            status: error.status(),
            error,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("invalid JSON body: {}", rejection.body_text())).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = self.error.code(), error = %self.error, "request failed");
        } else {
            tracing::debug!(code = self.error.code(), error = %self.error, "request rejected");
        }
        let body = ErrorResponse {
            error: self.error.to_string(),
            code: self.error.code(),
        };
        (self.status, Json(body)).into_response()
    }
}
