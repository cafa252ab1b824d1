//! The `{ status, message, id }` envelope returned by `POST /submitData`.
//!
//! Clients branch on the body's `status` field, so it always mirrors the
//! HTTP status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pereval_core::error::{PersistError, SubmissionError};
use pereval_core::submission::SubmissionReceipt;
use pereval_core::types::DbId;
use pereval_core::validation::FieldErrors;
use serde::Serialize;
use serde_json::Value;

/// Submission outcome envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitResponse {
    /// HTTP status code, repeated in the body.
    pub status: u16,
    /// `null` on success, a field-error map on 400, an error string on 500.
    pub message: Value,
    /// Id of the created crossing report, success only.
    pub id: Option<DbId>,
}

impl SubmitResponse {
    pub fn created(id: DbId) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            message: Value::Null,
            id: Some(id),
        }
    }

    pub fn invalid(errors: &FieldErrors) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST.as_u16(),
            message: serde_json::to_value(errors).unwrap_or_default(),
            id: None,
        }
    }

    pub fn failed(err: &PersistError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            message: Value::String(err.to_string()),
            id: None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<&Result<SubmissionReceipt, SubmissionError>> for SubmitResponse {
    fn from(outcome: &Result<SubmissionReceipt, SubmissionError>) -> Self {
        match outcome {
            Ok(receipt) => Self::created(receipt.pereval_id()),
            Err(SubmissionError::Validation(errors)) => Self::invalid(errors),
            Err(SubmissionError::Persistence(err)) => Self::failed(err),
        }
    }
}

impl IntoResponse for SubmitResponse {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}
