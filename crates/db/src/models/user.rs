//! Row model for the `users` table.

use pereval_core::models::Submitter;
use pereval_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A submitter row. `fam`/`name`/`otc` from the payload are stored as
/// `last_name`/`first_name`/`patronymic`.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: DbId,
    pub email: String,
    pub last_name: String,
    pub first_name: String,
    pub patronymic: String,
    pub phone: String,
    pub created_at: Timestamp,
}

impl From<UserRow> for Submitter {
    fn from(row: UserRow) -> Self {
        Submitter {
            id: row.id,
            email: row.email,
            last_name: row.last_name,
            first_name: row.first_name,
            patronymic: row.patronymic,
            phone: row.phone,
            created_at: row.created_at,
        }
    }
}
