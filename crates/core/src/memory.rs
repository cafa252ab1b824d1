//! In-process implementation of the persistence port.
//!
//! Writes are staged per transaction and applied on commit, so an abandoned
//! or failed transaction leaves nothing behind. The unique email constraint
//! is enforced both at insert time and again at commit, which reproduces the
//! race two concurrent submissions hit on a real database. Ids come from
//! per-table sequences that, like PostgreSQL sequences, are not rolled back.
//!
//! [`InMemoryStore::fail_on`] injects a backend failure at a chosen step.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StoreError;
use crate::models::{
    Coords, Image, Level, NewCoords, NewImage, NewLevel, NewPereval, NewSubmitter, Pereval,
    Submitter,
};
use crate::store::{PerevalStore, StoreTx};
use crate::types::DbId;

/// Store operation at which [`InMemoryStore`] should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Ping,
    Begin,
    FindSubmitter,
    InsertSubmitter,
    InsertPereval,
    InsertCoords,
    InsertLevel,
    /// The n-th image insert (zero-based) within a transaction.
    InsertImage(usize),
    Commit,
}

/// Committed contents of the store.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshot {
    pub submitters: Vec<Submitter>,
    pub perevals: Vec<Pereval>,
    pub coords: Vec<Coords>,
    pub levels: Vec<Level>,
    pub images: Vec<Image>,
}

impl MemorySnapshot {
    pub fn submitter_by_email(&self, email: &str) -> Option<&Submitter> {
        self.submitters.iter().find(|s| s.email == email)
    }

    pub fn pereval(&self, id: DbId) -> Option<&Pereval> {
        self.perevals.iter().find(|p| p.id == id)
    }

    pub fn coords_for(&self, pereval_id: DbId) -> Option<&Coords> {
        self.coords.iter().find(|c| c.pereval_id == pereval_id)
    }

    pub fn level_for(&self, pereval_id: DbId) -> Option<&Level> {
        self.levels.iter().find(|l| l.pereval_id == pereval_id)
    }

    pub fn images_for(&self, pereval_id: DbId) -> Vec<&Image> {
        self.images
            .iter()
            .filter(|i| i.pereval_id == pereval_id)
            .collect()
    }

    /// Total number of rows across all tables.
    pub fn row_count(&self) -> usize {
        self.submitters.len()
            + self.perevals.len()
            + self.coords.len()
            + self.levels.len()
            + self.images.len()
    }

    fn has_submitter(&self, id: DbId) -> bool {
        self.submitters.iter().any(|s| s.id == id)
    }

    fn has_pereval(&self, id: DbId) -> bool {
        self.perevals.iter().any(|p| p.id == id)
    }

    fn append(&mut self, staged: MemorySnapshot) {
        self.submitters.extend(staged.submitters);
        self.perevals.extend(staged.perevals);
        self.coords.extend(staged.coords);
        self.levels.extend(staged.levels);
        self.images.extend(staged.images);
    }
}

#[derive(Debug, Default)]
struct Sequences {
    submitters: AtomicI64,
    perevals: AtomicI64,
    coords: AtomicI64,
    levels: AtomicI64,
    images: AtomicI64,
}

fn next_id(seq: &AtomicI64) -> DbId {
    seq.fetch_add(1, Ordering::Relaxed) + 1
}

#[derive(Debug, Default)]
struct Shared {
    committed: Mutex<MemorySnapshot>,
    sequences: Sequences,
    fail_on: Mutex<Option<FailPoint>>,
}

impl Shared {
    fn committed(&self) -> MutexGuard<'_, MemorySnapshot> {
        self.committed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self, point: FailPoint) -> Result<(), StoreError> {
        let armed = *self.fail_on.lock().unwrap_or_else(PoisonError::into_inner);
        if armed == Some(point) {
            return Err(StoreError::backend(format!("injected failure at {point:?}")));
        }
        Ok(())
    }
}

/// Thread-safe in-memory [`PerevalStore`]. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    shared: Arc<Shared>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation matching `point` fail until
    /// [`clear_failure`](Self::clear_failure) is called.
    pub fn fail_on(&self, point: FailPoint) {
        *self.shared.fail_on.lock().unwrap_or_else(PoisonError::into_inner) = Some(point);
    }

    pub fn clear_failure(&self) {
        *self.shared.fail_on.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Copy of everything committed so far.
    pub fn snapshot(&self) -> MemorySnapshot {
        self.shared.committed().clone()
    }
}

#[async_trait]
impl PerevalStore for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        self.shared.check(FailPoint::Begin)?;
        Ok(Box::new(MemoryTx {
            shared: Arc::clone(&self.shared),
            staged: MemorySnapshot::default(),
            images_inserted: 0,
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.shared.check(FailPoint::Ping)
    }
}

struct MemoryTx {
    shared: Arc<Shared>,
    staged: MemorySnapshot,
    images_inserted: usize,
}

impl MemoryTx {
    fn email_taken(&self, email: &str) -> bool {
        self.staged.submitter_by_email(email).is_some()
            || self.shared.committed().submitter_by_email(email).is_some()
    }

    fn submitter_exists(&self, id: DbId) -> bool {
        self.staged.has_submitter(id) || self.shared.committed().has_submitter(id)
    }

    fn pereval_exists(&self, id: DbId) -> bool {
        self.staged.has_pereval(id) || self.shared.committed().has_pereval(id)
    }

    fn require_pereval(&self, pereval_id: DbId, table: &str) -> Result<(), StoreError> {
        if self.pereval_exists(pereval_id) {
            Ok(())
        } else {
            Err(StoreError::backend(format!(
                "insert into {table} violates foreign key: pereval {pereval_id} does not exist"
            )))
        }
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn find_submitter_by_email(
        &mut self,
        email: &str,
    ) -> Result<Option<Submitter>, StoreError> {
        self.shared.check(FailPoint::FindSubmitter)?;
        if let Some(staged) = self.staged.submitter_by_email(email) {
            return Ok(Some(staged.clone()));
        }
        Ok(self.shared.committed().submitter_by_email(email).cloned())
    }

    async fn insert_submitter(&mut self, input: &NewSubmitter) -> Result<Submitter, StoreError> {
        self.shared.check(FailPoint::InsertSubmitter)?;
        if self.email_taken(&input.email) {
            return Err(StoreError::UniqueViolation {
                constraint: "uq_users_email".into(),
            });
        }
        let submitter = Submitter {
            id: next_id(&self.shared.sequences.submitters),
            email: input.email.clone(),
            last_name: input.last_name.clone(),
            first_name: input.first_name.clone(),
            patronymic: input.patronymic.clone(),
            phone: input.phone.clone(),
            created_at: Utc::now(),
        };
        self.staged.submitters.push(submitter.clone());
        Ok(submitter)
    }

    async fn insert_pereval(
        &mut self,
        user_id: DbId,
        input: &NewPereval,
    ) -> Result<Pereval, StoreError> {
        self.shared.check(FailPoint::InsertPereval)?;
        if !self.submitter_exists(user_id) {
            return Err(StoreError::backend(format!(
                "insert into perevals violates foreign key: user {user_id} does not exist"
            )));
        }
        let pereval = Pereval {
            id: next_id(&self.shared.sequences.perevals),
            user_id,
            beauty_title: input.beauty_title.clone(),
            title: input.title.clone(),
            other_titles: input.other_titles.clone(),
            connect: input.connect.clone(),
            add_time: input.add_time,
            created_at: Utc::now(),
        };
        self.staged.perevals.push(pereval.clone());
        Ok(pereval)
    }

    async fn insert_coords(
        &mut self,
        pereval_id: DbId,
        input: &NewCoords,
    ) -> Result<Coords, StoreError> {
        self.shared.check(FailPoint::InsertCoords)?;
        self.require_pereval(pereval_id, "coords")?;
        if self.staged.coords_for(pereval_id).is_some()
            || self.shared.committed().coords_for(pereval_id).is_some()
        {
            return Err(StoreError::UniqueViolation {
                constraint: "uq_coords_pereval_id".into(),
            });
        }
        let coords = Coords {
            id: next_id(&self.shared.sequences.coords),
            pereval_id,
            latitude: input.latitude,
            longitude: input.longitude,
            height: input.height,
        };
        self.staged.coords.push(coords.clone());
        Ok(coords)
    }

    async fn insert_level(
        &mut self,
        pereval_id: DbId,
        input: &NewLevel,
    ) -> Result<Level, StoreError> {
        self.shared.check(FailPoint::InsertLevel)?;
        self.require_pereval(pereval_id, "levels")?;
        if self.staged.level_for(pereval_id).is_some()
            || self.shared.committed().level_for(pereval_id).is_some()
        {
            return Err(StoreError::UniqueViolation {
                constraint: "uq_levels_pereval_id".into(),
            });
        }
        let level = Level {
            id: next_id(&self.shared.sequences.levels),
            pereval_id,
            winter: input.winter.clone(),
            summer: input.summer.clone(),
            spring: input.spring.clone(),
            autumn: input.autumn.clone(),
        };
        self.staged.levels.push(level.clone());
        Ok(level)
    }

    async fn insert_image(
        &mut self,
        pereval_id: DbId,
        input: &NewImage,
    ) -> Result<Image, StoreError> {
        self.shared
            .check(FailPoint::InsertImage(self.images_inserted))?;
        self.require_pereval(pereval_id, "images")?;
        let image = Image {
            id: next_id(&self.shared.sequences.images),
            pereval_id,
            title: input.title.clone(),
            data: input.data.clone(),
            mime_type: input.mime_type.clone(),
            width: input.width,
            height: input.height,
        };
        self.staged.images.push(image.clone());
        self.images_inserted += 1;
        Ok(image)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.shared.check(FailPoint::Commit)?;
        let MemoryTx { shared, staged, .. } = *self;
        let mut committed = shared.committed();
        if staged
            .submitters
            .iter()
            .any(|s| committed.submitter_by_email(&s.email).is_some())
        {
            return Err(StoreError::UniqueViolation {
                constraint: "uq_users_email".into(),
            });
        }
        committed.append(staged);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
