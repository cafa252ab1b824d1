//! Repository for the `levels` table.

use pereval_core::models::NewLevel;
use pereval_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::level::LevelRow;

const COLUMNS: &str = "id, pereval_id, winter, summer, spring, autumn";

pub struct LevelRepo;

impl LevelRepo {
    /// Insert the seasonal grades of a report. At most one row per report
    /// (`uq_levels_pereval_id`).
    pub async fn create<'e, E>(
        executor: E,
        pereval_id: DbId,
        input: &NewLevel,
    ) -> Result<LevelRow, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO levels (pereval_id, winter, summer, spring, autumn)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LevelRow>(&query)
            .bind(pereval_id)
            .bind(&input.winter)
            .bind(&input.summer)
            .bind(&input.spring)
            .bind(&input.autumn)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_pereval<'e, E>(
        executor: E,
        pereval_id: DbId,
    ) -> Result<Option<LevelRow>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM levels WHERE pereval_id = $1");
        sqlx::query_as::<_, LevelRow>(&query)
            .bind(pereval_id)
            .fetch_optional(executor)
            .await
    }
}
