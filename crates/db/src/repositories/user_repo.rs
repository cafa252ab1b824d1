//! Repository for the `users` table.

use pereval_core::models::NewSubmitter;
use pereval_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::user::UserRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, last_name, first_name, patronymic, phone, created_at";

/// Provides lookup and insert for submitters. Rows are never updated.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new submitter, returning the created row.
    ///
    /// Fails with a unique violation on `uq_users_email` if the email exists.
    pub async fn create<'e, E>(executor: E, input: &NewSubmitter) -> Result<UserRow, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO users (email, last_name, first_name, patronymic, phone)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(&input.email)
            .bind(&input.last_name)
            .bind(&input.first_name)
            .bind(&input.patronymic)
            .bind(&input.phone)
            .fetch_one(executor)
            .await
    }

    /// Find a submitter by exact email match.
    pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<UserRow>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<UserRow>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn count<'e, E>(executor: E) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(executor)
            .await
    }
}
