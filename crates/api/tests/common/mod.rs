#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use pereval_api::config::{LogFormat, ServerConfig};
use pereval_api::router::build_app_router;
use pereval_api::state::AppState;
use pereval_core::store::PerevalStore;
use serde_json::{json, Value};
use tower::ServiceExt;

/// 1x1 RGBA PNG.
pub const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";
/// 2x3 RGB PNG.
pub const PNG_2X3: &str = "iVBORw0KGgoAAAANSUhEUgAAAAIAAAADCAIAAAA2iEnWAAAAEElEQVR4nGP4z8AARAwoFABE0AX7pM/egAAAAABJRU5ErkJggg==";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_body_bytes: 16 * 1024 * 1024,
        database_max_connections: 5,
        log_format: LogFormat::Text,
    }
}

/// Build the full application router over `store` with the production
/// middleware stack.
pub fn build_test_app(store: impl PerevalStore + 'static) -> Router {
    build_test_app_with(store, test_config())
}

pub fn build_test_app_with(store: impl PerevalStore + 'static, config: ServerConfig) -> Router {
    let state = AppState {
        store: Arc::new(store),
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// A complete, valid submission for `email`.
pub fn valid_payload(email: &str, first_name: &str) -> Value {
    json!({
        "beauty_title": "пер. ",
        "title": "Pkhia",
        "other_titles": "Triev",
        "connect": "",
        "add_time": "2021-09-22 13:18:13",
        "user": {
            "email": email,
            "fam": "Pupkin",
            "name": first_name,
            "otc": "Vasilievich",
            "phone": "+7 555 55 55"
        },
        "coords": {"latitude": 45.3842, "longitude": 7.1525, "height": 1200},
        "level": {"winter": "", "summer": "1A", "autumn": "1A", "spring": ""},
        "images": [
            {"data": PNG_1X1, "title": "Saddle"},
            {"data": PNG_2X3, "title": "Ascent"}
        ]
    })
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> Response<Body> {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: impl Into<Body>) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
