//! PostgreSQL implementation of the core persistence port.

use async_trait::async_trait;
use pereval_core::error::StoreError;
use pereval_core::models::{
    Coords, Image, Level, NewCoords, NewImage, NewLevel, NewPereval, NewSubmitter, Pereval,
    Submitter,
};
use pereval_core::store::{PerevalStore, StoreTx};
use pereval_core::types::DbId;
use sqlx::{Postgres, Transaction};

use crate::error::classify;
use crate::repositories::{CoordsRepo, ImageRepo, LevelRepo, PerevalRepo, UserRepo};
use crate::DbPool;

/// [`PerevalStore`] backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgPerevalStore {
    pool: DbPool,
}

impl PgPerevalStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl PerevalStore for PgPerevalStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let tx = self.pool.begin().await.map_err(classify)?;
        Ok(Box::new(PgStoreTx { tx }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await.map_err(classify)
    }
}

/// An open PostgreSQL transaction. Dropping it without committing rolls back.
pub struct PgStoreTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgStoreTx {
    async fn find_submitter_by_email(
        &mut self,
        email: &str,
    ) -> Result<Option<Submitter>, StoreError> {
        let row = UserRepo::find_by_email(&mut *self.tx, email)
            .await
            .map_err(classify)?;
        Ok(row.map(Into::into))
    }

    async fn insert_submitter(&mut self, input: &NewSubmitter) -> Result<Submitter, StoreError> {
        let row = UserRepo::create(&mut *self.tx, input)
            .await
            .map_err(classify)?;
        tracing::debug!(user_id = row.id, "Submitter row inserted");
        Ok(row.into())
    }

    async fn insert_pereval(
        &mut self,
        user_id: DbId,
        input: &NewPereval,
    ) -> Result<Pereval, StoreError> {
        let row = PerevalRepo::create(&mut *self.tx, user_id, input)
            .await
            .map_err(classify)?;
        tracing::debug!(pereval_id = row.id, user_id, "Pereval row inserted");
        Ok(row.into())
    }

    async fn insert_coords(
        &mut self,
        pereval_id: DbId,
        input: &NewCoords,
    ) -> Result<Coords, StoreError> {
        let row = CoordsRepo::create(&mut *self.tx, pereval_id, input)
            .await
            .map_err(classify)?;
        Ok(row.into())
    }

    async fn insert_level(
        &mut self,
        pereval_id: DbId,
        input: &NewLevel,
    ) -> Result<Level, StoreError> {
        let row = LevelRepo::create(&mut *self.tx, pereval_id, input)
            .await
            .map_err(classify)?;
        Ok(row.into())
    }

    async fn insert_image(
        &mut self,
        pereval_id: DbId,
        input: &NewImage,
    ) -> Result<Image, StoreError> {
        let row = ImageRepo::create(&mut *self.tx, pereval_id, input)
            .await
            .map_err(classify)?;
        tracing::debug!(
            image_id = row.id,
            pereval_id,
            bytes = input.data.len(),
            "Image row inserted"
        );
        Ok(row.into())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(classify)
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await.map_err(classify)
    }
}
