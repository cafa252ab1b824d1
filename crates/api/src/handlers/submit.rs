//! Handler for `POST /api/v1/submitData`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use pereval_core::error::SubmissionError;
use pereval_core::submission;
use pereval_core::validation::FieldErrors;
use serde_json::Value;

use crate::response::SubmitResponse;
use crate::state::AppState;

/// POST /api/v1/submitData
///
/// Accept one composite crossing report (submitter, coords, level, images),
/// validate it and persist it in a single transaction. Always answers with a
/// [`SubmitResponse`] envelope, including for bodies that are not JSON
/// (400) or exceed the body limit (413).
pub async fn submit_data(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> SubmitResponse {
    let payload = match body {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            tracing::warn!(
                status = %rejection.status(),
                error = %rejection.body_text(),
                "Rejected unreadable submission body"
            );
            let mut response = SubmitResponse::invalid(&FieldErrors::non_field(rejection.body_text()));
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                response.status = StatusCode::PAYLOAD_TOO_LARGE.as_u16();
            }
            return response;
        }
    };

    let outcome = submission::submit(state.store.as_ref(), &payload).await;

    match &outcome {
        Ok(receipt) => tracing::info!(
            pereval_id = receipt.pereval_id(),
            user_id = receipt.submitter.id,
            submitter_created = receipt.submitter_created,
            image_count = receipt.persisted.images.len(),
            "Crossing report submitted"
        ),
        Err(SubmissionError::Validation(errors)) => tracing::warn!(
            error_count = errors.len(),
            fields = %errors,
            "Submission failed validation"
        ),
        Err(SubmissionError::Persistence(err)) => tracing::error!(
            step = %err.step,
            error = %err.source,
            "Submission could not be persisted"
        ),
    }

    SubmitResponse::from(&outcome)
}
