//! Repository for the `perevals` table.

use pereval_core::models::NewPereval;
use pereval_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::pereval::PerevalRow;

const COLUMNS: &str =
    "id, user_id, beauty_title, title, other_titles, connect, add_time, created_at";

/// Provides insert and lookup for crossing reports.
pub struct PerevalRepo;

impl PerevalRepo {
    /// Insert a crossing report owned by `user_id`, returning the created row.
    pub async fn create<'e, E>(
        executor: E,
        user_id: DbId,
        input: &NewPereval,
    ) -> Result<PerevalRow, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO perevals (user_id, beauty_title, title, other_titles, connect, add_time)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PerevalRow>(&query)
            .bind(user_id)
            .bind(&input.beauty_title)
            .bind(&input.title)
            .bind(&input.other_titles)
            .bind(&input.connect)
            .bind(input.add_time)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<PerevalRow>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM perevals WHERE id = $1");
        sqlx::query_as::<_, PerevalRow>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// All reports filed by one submitter, oldest first.
    pub async fn list_by_user<'e, E>(executor: E, user_id: DbId) -> Result<Vec<PerevalRow>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM perevals WHERE user_id = $1 ORDER BY id");
        sqlx::query_as::<_, PerevalRow>(&query)
            .bind(user_id)
            .fetch_all(executor)
            .await
    }

    pub async fn count<'e, E>(executor: E) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar("SELECT COUNT(*) FROM perevals")
            .fetch_one(executor)
            .await
    }
}
