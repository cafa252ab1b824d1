//! Row model for the `perevals` table.

use pereval_core::models::Pereval;
use pereval_core::types::{DbId, Timestamp};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct PerevalRow {
    pub id: DbId,
    pub user_id: DbId,
    pub beauty_title: String,
    pub title: String,
    pub other_titles: String,
    pub connect: String,
    pub add_time: Timestamp,
    pub created_at: Timestamp,
}

impl From<PerevalRow> for Pereval {
    fn from(row: PerevalRow) -> Self {
        Pereval {
            id: row.id,
            user_id: row.user_id,
            beauty_title: row.beauty_title,
            title: row.title,
            other_titles: row.other_titles,
            connect: row.connect,
            add_time: row.add_time,
            created_at: row.created_at,
        }
    }
}
