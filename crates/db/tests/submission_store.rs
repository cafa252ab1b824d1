//! Integration tests for the PostgreSQL persistence port.
//!
//! Exercises the full submission flow against a real database:
//! - All rows created and linked on success
//! - Submitter reuse by email
//! - Rollback of every step when a later insert fails
//! - Unique constraint classification

use assert_matches::assert_matches;
use async_trait::async_trait;
use pereval_core::error::{PersistError, PersistStep, StoreError, SubmissionError};
use pereval_core::models::{
    Coords, Image, Level, NewCoords, NewImage, NewLevel, NewPereval, NewSubmitter, Pereval,
    Submitter,
};
use pereval_core::store::{PerevalStore, StoreTx};
use pereval_core::submission::submit;
use pereval_core::types::DbId;
use pereval_db::error::classify;
use pereval_db::repositories::{CoordsRepo, ImageRepo, LevelRepo, PerevalRepo, UserRepo};
use pereval_db::PgPerevalStore;
use serde_json::{json, Value};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";
const PNG_2X3: &str = "iVBORw0KGgoAAAANSUhEUgAAAAIAAAADCAIAAAA2iEnWAAAAEElEQVR4nGP4z8AARAwoFABE0AX7pM/egAAAAABJRU5ErkJggg==";

fn payload(email: &str, first_name: &str) -> Value {
    json!({
        "user": {"fam": "Ivanov", "name": first_name, "otc": "", "email": email, "phone": "111"},
        "coords": {"latitude": 45.1, "longitude": 7.2, "height": 1200},
        "level": {"winter": "1A", "summer": "1B", "spring": "1A", "autumn": "1A"},
        "title": "Pass X",
        "add_time": "2021-09-22 13:18:13",
        "images": [
            {"title": "view1", "data": PNG_1X1},
            {"title": "view2", "data": PNG_2X3}
        ]
    })
}

fn contact(email: &str) -> NewSubmitter {
    NewSubmitter {
        email: email.to_string(),
        last_name: "Ivanov".to_string(),
        first_name: "Ivan".to_string(),
        patronymic: String::new(),
        phone: "111".to_string(),
    }
}

/// Wraps the real store and fails every coords insert, after the report row
/// has already been written inside the transaction.
struct FailingCoordsStore(PgPerevalStore);

struct FailingCoordsTx(Box<dyn StoreTx>);

#[async_trait]
impl PerevalStore for FailingCoordsStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        Ok(Box::new(FailingCoordsTx(self.0.begin().await?)))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.0.ping().await
    }
}

#[async_trait]
impl StoreTx for FailingCoordsTx {
    async fn find_submitter_by_email(
        &mut self,
        email: &str,
    ) -> Result<Option<Submitter>, StoreError> {
        self.0.find_submitter_by_email(email).await
    }

    async fn insert_submitter(&mut self, input: &NewSubmitter) -> Result<Submitter, StoreError> {
        self.0.insert_submitter(input).await
    }

    async fn insert_pereval(
        &mut self,
        user_id: DbId,
        input: &NewPereval,
    ) -> Result<Pereval, StoreError> {
        self.0.insert_pereval(user_id, input).await
    }

    async fn insert_coords(
        &mut self,
        _pereval_id: DbId,
        _input: &NewCoords,
    ) -> Result<Coords, StoreError> {
        Err(StoreError::backend("simulated coords failure"))
    }

    async fn insert_level(
        &mut self,
        pereval_id: DbId,
        input: &NewLevel,
    ) -> Result<Level, StoreError> {
        self.0.insert_level(pereval_id, input).await
    }

    async fn insert_image(
        &mut self,
        pereval_id: DbId,
        input: &NewImage,
    ) -> Result<Image, StoreError> {
        self.0.insert_image(pereval_id, input).await
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.0.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.0.rollback().await
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_health_check_and_ping(pool: PgPool) {
    pereval_db::health_check(&pool).await.unwrap();
    PgPerevalStore::new(pool).ping().await.unwrap();
}

// ---------------------------------------------------------------------------
// Successful submissions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_creates_linked_rows(pool: PgPool) {
    let store = PgPerevalStore::new(pool.clone());

    let receipt = submit(&store, &payload("a@b.com", "Ivan")).await.unwrap();
    let id = receipt.pereval_id();

    let pereval = PerevalRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(pereval.user_id, receipt.submitter.id);
    assert_eq!(pereval.title, "Pass X");

    let coords = CoordsRepo::find_by_pereval(&pool, id).await.unwrap().unwrap();
    assert_eq!(coords.height, 1200);

    let level = LevelRepo::find_by_pereval(&pool, id).await.unwrap().unwrap();
    assert_eq!(level.summer, "1B");

    let images = ImageRepo::list_by_pereval(&pool, id).await.unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].title, "view1");
    assert_eq!(images[1].mime_type, "image/png");
    assert_eq!((images[1].width, images[1].height), (2, 3));
    assert!(!images[0].data.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_same_email_reuses_submitter(pool: PgPool) {
    let store = PgPerevalStore::new(pool.clone());

    let first = submit(&store, &payload("a@b.com", "Ivan")).await.unwrap();
    let second = submit(&store, &payload("a@b.com", "Pyotr")).await.unwrap();

    assert!(first.submitter_created);
    assert!(!second.submitter_created);
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 1);
    assert_eq!(PerevalRepo::count(&pool).await.unwrap(), 2);

    let user = UserRepo::find_by_id(&pool, first.submitter.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.first_name, "Ivan", "existing submitter must not be updated");

    let reports = PerevalRepo::list_by_user(&pool, user.id).await.unwrap();
    assert_eq!(reports.len(), 2);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_validation_failure_writes_nothing(pool: PgPool) {
    let store = PgPerevalStore::new(pool.clone());
    let mut bad = payload("a@b.com", "Ivan");
    bad["coords"].as_object_mut().unwrap().remove("latitude");

    assert_matches!(
        submit(&store, &bad).await,
        Err(SubmissionError::Validation(_))
    );
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 0);
    assert_eq!(PerevalRepo::count(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_coords_failure_leaves_no_orphaned_report(pool: PgPool) {
    let store = FailingCoordsStore(PgPerevalStore::new(pool.clone()));

    let err = submit(&store, &payload("a@b.com", "Ivan"))
        .await
        .unwrap_err();

    assert_matches!(
        err,
        SubmissionError::Persistence(PersistError { step: PersistStep::CreateCoords, .. })
    );
    assert_eq!(PerevalRepo::count(&pool).await.unwrap(), 0);
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_email_classified_as_unique_violation(pool: PgPool) {
    UserRepo::create(&pool, &contact("dup@b.com")).await.unwrap();

    let err = UserRepo::create(&pool, &contact("dup@b.com"))
        .await
        .unwrap_err();

    assert_matches!(
        classify(err),
        StoreError::UniqueViolation { constraint } if constraint == "uq_users_email"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_new_email_loser_fails_cleanly(pool: PgPool) {
    let store = PgPerevalStore::new(pool.clone());

    let mut first = store.begin().await.unwrap();
    first.insert_submitter(&contact("race@b.com")).await.unwrap();
    first.commit().await.unwrap();

    // A second transaction that missed the committed row still hits the
    // constraint on insert.
    let mut second = store.begin().await.unwrap();
    assert_matches!(
        second.insert_submitter(&contact("race@b.com")).await,
        Err(StoreError::UniqueViolation { .. })
    );
    second.rollback().await.unwrap();

    assert_eq!(UserRepo::count(&pool).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_coords_row_for_report_rejected(pool: PgPool) {
    let store = PgPerevalStore::new(pool.clone());
    let receipt = submit(&store, &payload("a@b.com", "Ivan")).await.unwrap();

    let err = CoordsRepo::create(
        &pool,
        receipt.pereval_id(),
        &NewCoords {
            latitude: 1.0,
            longitude: 2.0,
            height: 3,
        },
    )
    .await
    .unwrap_err();

    assert_matches!(
        classify(err),
        StoreError::UniqueViolation { constraint } if constraint == "uq_coords_pereval_id"
    );
}
