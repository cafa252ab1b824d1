//! Repository for the `coords` table.

use pereval_core::models::NewCoords;
use pereval_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::coords::CoordsRow;

const COLUMNS: &str = "id, pereval_id, latitude, longitude, height";

pub struct CoordsRepo;

impl CoordsRepo {
    /// Insert the coordinates of a report. At most one row per report
    /// (`uq_coords_pereval_id`).
    pub async fn create<'e, E>(
        executor: E,
        pereval_id: DbId,
        input: &NewCoords,
    ) -> Result<CoordsRow, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO coords (pereval_id, latitude, longitude, height)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CoordsRow>(&query)
            .bind(pereval_id)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(input.height)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_pereval<'e, E>(
        executor: E,
        pereval_id: DbId,
    ) -> Result<Option<CoordsRow>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM coords WHERE pereval_id = $1");
        sqlx::query_as::<_, CoordsRow>(&query)
            .bind(pereval_id)
            .fetch_optional(executor)
            .await
    }
}
