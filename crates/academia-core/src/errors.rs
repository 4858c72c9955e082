//! Application error type with HTTP response conversion.
//!
//! [`AppError`] pairs an HTTP status with an [`anyhow::Error`] and, for
//! request-shape or authorization-rule violations, a list of
//! [`FieldError`]s naming the offending fields.
//!
//! Server errors (5xx) never leak their cause to clients: the full error
//! chain is logged and the response body carries a generic message.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Error, anyhow};
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

pub use axum::http::StatusCode;

/// Generic message returned for every server-side failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// An error attached to a single request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
    pub fields: Vec<FieldError>,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
            fields: Vec::new(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, anyhow!(message.into()))
    }

    /// A field-tagged validation failure.
    pub fn validation(fields: Vec<FieldError>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: anyhow!("validation failed"),
            fields,
        }
    }

    /// Shorthand for a validation failure on a single field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::validation(vec![FieldError::new(field, message)])
    }

    pub fn is_validation(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Message for `field`, if this error carries one.
    pub fn field_message(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.message.as_str())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.error, self.status)
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError::internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = ?self.error, "request failed");
            let body = Json(json!({ "error": INTERNAL_ERROR_MESSAGE }));
            return (self.status, body).into_response();
        }

        if self.fields.is_empty() {
            let body = Json(json!({
                "error": self.error.to_string()
            }));
            return (self.status, body).into_response();
        }

        let fields: BTreeMap<String, String> = self
            .fields
            .into_iter()
            .map(|f| (f.field, f.message))
            .collect();
        let body = Json(json!({
            "error": self.error.to_string(),
            "fields": fields,
        }));

        (self.status, body).into_response()
    }
}
