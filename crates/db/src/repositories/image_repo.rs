//! Repository for the `images` table.

use pereval_core::models::NewImage;
use pereval_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::image::ImageRow;

const COLUMNS: &str = "id, pereval_id, title, data, mime_type, width, height, created_at";

pub struct ImageRepo;

impl ImageRepo {
    /// Insert one image attached to a report, returning the created row.
    pub async fn create<'e, E>(
        executor: E,
        pereval_id: DbId,
        input: &NewImage,
    ) -> Result<ImageRow, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO images (pereval_id, title, data, mime_type, width, height)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImageRow>(&query)
            .bind(pereval_id)
            .bind(&input.title)
            .bind(&input.data)
            .bind(&input.mime_type)
            .bind(input.width)
            .bind(input.height)
            .fetch_one(executor)
            .await
    }

    /// Images of a report in insertion order.
    pub async fn list_by_pereval<'e, E>(
        executor: E,
        pereval_id: DbId,
    ) -> Result<Vec<ImageRow>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM images WHERE pereval_id = $1 ORDER BY id");
        sqlx::query_as::<_, ImageRow>(&query)
            .bind(pereval_id)
            .fetch_all(executor)
            .await
    }
}
