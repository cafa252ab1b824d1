//! HTTP tests for `POST /api/v1/submitData` against the in-memory store.
//!
//! These exercise the full middleware stack and the response envelope
//! without a database.

mod common;

use axum::http::StatusCode;
use common::{body_json, post_json, post_raw, valid_payload};
use pereval_core::memory::{FailPoint, InMemoryStore};
use serde_json::json;

const SUBMIT: &str = "/api/v1/submitData";

// ---------------------------------------------------------------------------
// Success
// ---------------------------------------------------------------------------

#[tokio::test]
async fn valid_submission_returns_200_with_id() {
    let store = InMemoryStore::new();
    let app = common::build_test_app(store.clone());

    let response = post_json(app, SUBMIT, &valid_payload("qwerty@mail.ru", "Vasya")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], 200);
    assert!(json["message"].is_null());

    let id = json["id"].as_i64().expect("id must be an integer");
    let snap = store.snapshot();
    let pereval = snap.pereval(id).expect("report row exists");
    assert_eq!(pereval.title, "Pkhia");
    assert_eq!(snap.coords_for(id).map(|c| c.height), Some(1200));
    assert_eq!(snap.level_for(id).map(|l| l.summer.as_str()), Some("1A"));

    let images = snap.images_for(id);
    assert_eq!(images.len(), 2);
    assert_eq!(images[1].title, "Ascent");
    assert_eq!((images[1].width, images[1].height), (2, 3));
}

#[tokio::test]
async fn minimal_submission_returns_full_envelope() {
    let store = InMemoryStore::new();
    let payload = json!({
        "user": {"fam": "Ivanov", "name": "Ivan", "otc": "", "email": "a@b.com", "phone": "111"},
        "coords": {"latitude": 45.1, "longitude": 7.2, "height": 1200},
        "level": {"winter": "1A", "summer": "1B", "spring": "1A", "autumn": "1A"},
        "title": "Pass X",
        "images": [{"title": "view1", "data": common::PNG_1X1}]
    });

    let response = post_json(common::build_test_app(store.clone()), SUBMIT, &payload).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let id = store.snapshot().perevals[0].id;
    assert_eq!(json, json!({"status": 200, "message": null, "id": id}));
}

#[tokio::test]
async fn single_image_object_is_accepted() {
    let store = InMemoryStore::new();
    let mut payload = valid_payload("one@mail.ru", "Vasya");
    payload["images"] = json!({"data": common::PNG_1X1, "title": "Only"});

    let response = post_json(common::build_test_app(store.clone()), SUBMIT, &payload).await;

    assert_eq!(response.status(), StatusCode::OK);
    let id = body_json(response).await["id"].as_i64().unwrap();
    assert_eq!(store.snapshot().images_for(id).len(), 1);
}

#[tokio::test]
async fn repeat_email_links_to_existing_submitter() {
    let store = InMemoryStore::new();

    let first = post_json(
        common::build_test_app(store.clone()),
        SUBMIT,
        &valid_payload("qwerty@mail.ru", "Vasya"),
    )
    .await;
    let second = post_json(
        common::build_test_app(store.clone()),
        SUBMIT,
        &valid_payload("qwerty@mail.ru", "Petya"),
    )
    .await;

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);
    let first_id = body_json(first).await["id"].as_i64().unwrap();
    let second_id = body_json(second).await["id"].as_i64().unwrap();
    assert_ne!(first_id, second_id);

    let snap = store.snapshot();
    assert_eq!(snap.submitters.len(), 1);
    assert_eq!(snap.submitters[0].first_name, "Vasya");
    assert_eq!(
        snap.pereval(first_id).unwrap().user_id,
        snap.pereval(second_id).unwrap().user_id
    );
}

// ---------------------------------------------------------------------------
// Validation failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_latitude_returns_400_and_writes_nothing() {
    let store = InMemoryStore::new();
    let mut payload = valid_payload("qwerty@mail.ru", "Vasya");
    payload["coords"].as_object_mut().unwrap().remove("latitude");

    let response = post_json(common::build_test_app(store.clone()), SUBMIT, &payload).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["status"], 400);
    assert!(json["id"].is_null());
    assert_eq!(
        json["message"]["coords.latitude"],
        json!(["This field is required."])
    );
    assert_eq!(store.snapshot().row_count(), 0);
}

#[tokio::test]
async fn every_invalid_field_is_reported() {
    let store = InMemoryStore::new();
    let mut payload = valid_payload("not-an-email", "Vasya");
    payload["coords"]["height"] = json!("1200");
    payload["images"] = json!([]);

    let response = post_json(common::build_test_app(store.clone()), SUBMIT, &payload).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let message = &body_json(response).await["message"];
    assert!(message.get("user.email").is_some());
    assert!(message.get("coords.height").is_some());
    assert_eq!(message["images"], json!(["This list may not be empty."]));
}

#[tokio::test]
async fn malformed_json_returns_400_envelope() {
    let store = InMemoryStore::new();

    let response = post_raw(
        common::build_test_app(store.clone()),
        SUBMIT,
        "{\"title\": ",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["status"], 400);
    assert!(json["message"]["non_field_errors"].is_array());
    assert_eq!(store.snapshot().row_count(), 0);
}

#[tokio::test]
async fn oversized_body_returns_413_envelope() {
    let store = InMemoryStore::new();
    let config = pereval_api::config::ServerConfig {
        max_body_bytes: 64,
        ..common::test_config()
    };
    let app = common::build_test_app_with(store.clone(), config);

    let response = post_json(app, SUBMIT, &valid_payload("qwerty@mail.ru", "Vasya")).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["status"], 413);
    assert_eq!(store.snapshot().row_count(), 0);
}

// ---------------------------------------------------------------------------
// Persistence failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn coords_failure_returns_500_without_orphaned_report() {
    let store = InMemoryStore::new();
    store.fail_on(FailPoint::InsertCoords);

    let response = post_json(
        common::build_test_app(store.clone()),
        SUBMIT,
        &valid_payload("qwerty@mail.ru", "Vasya"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["status"], 500);
    assert!(json["id"].is_null());
    let message = json["message"].as_str().expect("message is a string");
    assert!(message.starts_with("Failed to create coords"), "got: {message}");

    let snap = store.snapshot();
    assert!(snap.perevals.is_empty());
    assert!(snap.submitters.is_empty());
}

#[tokio::test]
async fn failure_on_second_image_rolls_back_first() {
    let store = InMemoryStore::new();
    store.fail_on(FailPoint::InsertImage(1));

    let response = post_json(
        common::build_test_app(store.clone()),
        SUBMIT,
        &valid_payload("qwerty@mail.ru", "Vasya"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(store.snapshot().row_count(), 0);

    store.clear_failure();
    let retry = post_json(
        common::build_test_app(store.clone()),
        SUBMIT,
        &valid_payload("qwerty@mail.ru", "Vasya"),
    )
    .await;
    assert_eq!(retry.status(), StatusCode::OK);
}
