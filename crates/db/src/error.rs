//! Mapping from sqlx errors to the core [`StoreError`].

use pereval_core::error::StoreError;

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Classify a sqlx error for the persistence port.
///
/// - Unique constraint violations map to [`StoreError::UniqueViolation`]
///   carrying the constraint name (all schema constraints use a `uq_` prefix).
/// - Everything else is wrapped as [`StoreError::Backend`].
pub fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            tracing::warn!(%constraint, "Unique constraint violated");
            return StoreError::UniqueViolation { constraint };
        }
    }
    tracing::error!(error = %err, "Database error");
    StoreError::Backend(Box::new(err))
}
