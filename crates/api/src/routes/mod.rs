pub mod health;

use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /submitData        submit a crossing report (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/submitData", post(handlers::submit::submit_data))
}
