//! Row model for the `images` table.

use pereval_core::models::Image;
use pereval_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// An image row. `data` is the raw file content (BYTEA).
#[derive(Debug, Clone, FromRow)]
pub struct ImageRow {
    pub id: DbId,
    pub pereval_id: DbId,
    pub title: String,
    pub data: Vec<u8>,
    pub mime_type: String,
    pub width: i32,
    pub height: i32,
    pub created_at: Timestamp,
}

impl From<ImageRow> for Image {
    fn from(row: ImageRow) -> Self {
        Image {
            id: row.id,
            pereval_id: row.pereval_id,
            title: row.title,
            data: row.data,
            mime_type: row.mime_type,
            width: row.width,
            height: row.height,
        }
    }
}
