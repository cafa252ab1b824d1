//! Persistence port for crossing-report submissions.
//!
//! The core never talks to a database directly. It opens a [`StoreTx`] from a
//! [`PerevalStore`], performs its writes through it, and commits. Dropping a
//! transaction without calling [`StoreTx::commit`] must discard every write
//! made through it.
//!
//! Implementations: `pereval_db::PgPerevalStore` (PostgreSQL) and
//! [`crate::memory::InMemoryStore`].

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{
    Coords, Image, Level, NewCoords, NewImage, NewLevel, NewPereval, NewSubmitter, Pereval,
    Submitter,
};
use crate::types::DbId;

/// A backend that can hand out transactions.
#[async_trait]
pub trait PerevalStore: Send + Sync {
    /// Open a new transaction.
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError>;

    /// Cheap liveness probe used by the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// One open unit of work. Writes become visible to other transactions only
/// after [`commit`](StoreTx::commit).
#[async_trait]
pub trait StoreTx: Send {
    async fn find_submitter_by_email(
        &mut self,
        email: &str,
    ) -> Result<Option<Submitter>, StoreError>;

    /// Insert a submitter. Fails with [`StoreError::UniqueViolation`] if the
    /// email is already taken.
    async fn insert_submitter(&mut self, input: &NewSubmitter) -> Result<Submitter, StoreError>;

    async fn insert_pereval(
        &mut self,
        user_id: DbId,
        input: &NewPereval,
    ) -> Result<Pereval, StoreError>;

    async fn insert_coords(
        &mut self,
        pereval_id: DbId,
        input: &NewCoords,
    ) -> Result<Coords, StoreError>;

    async fn insert_level(&mut self, pereval_id: DbId, input: &NewLevel)
        -> Result<Level, StoreError>;

    async fn insert_image(&mut self, pereval_id: DbId, input: &NewImage)
        -> Result<Image, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
