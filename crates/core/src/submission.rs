//! End-to-end handling of one composite submission.
//!
//! validate → begin → resolve submitter → persist report and children →
//! commit. Validation failures return before a transaction is opened. Any
//! store failure after that rolls the whole transaction back, so a report is
//! never left without its coords or level, and a submitter created for a
//! failed submission does not survive it.

use serde_json::Value;

use crate::error::{PersistError, PersistStep, SubmissionError};
use crate::identity;
use crate::models::{Submitter, ValidatedSubmission};
use crate::persister::{self, PersistedPereval};
use crate::store::{PerevalStore, StoreTx};
use crate::types::DbId;
use crate::validation;

/// What a successful submission wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub submitter: Submitter,
    /// `true` if this submission introduced a new email.
    pub submitter_created: bool,
    pub persisted: PersistedPereval,
}

impl SubmissionReceipt {
    /// Id of the new crossing report.
    pub fn pereval_id(&self) -> DbId {
        self.persisted.pereval.id
    }
}

/// Validate `payload` and, if it passes, persist it atomically.
pub async fn submit(
    store: &dyn PerevalStore,
    payload: &Value,
) -> Result<SubmissionReceipt, SubmissionError> {
    let submission = validation::validate(payload).map_err(SubmissionError::Validation)?;
    submit_validated(store, &submission)
        .await
        .map_err(SubmissionError::Persistence)
}

/// Persist an already-validated submission in a single transaction.
pub async fn submit_validated(
    store: &dyn PerevalStore,
    submission: &ValidatedSubmission,
) -> Result<SubmissionReceipt, PersistError> {
    let mut tx = store
        .begin()
        .await
        .map_err(PersistError::at(PersistStep::BeginTransaction))?;

    let written = write_all(tx.as_mut(), submission).await;
    match written {
        Ok(receipt) => {
            tx.commit()
                .await
                .map_err(PersistError::at(PersistStep::Commit))?;
            Ok(receipt)
        }
        Err(err) => {
            // Rollback errors are dropped; the step failure is what gets reported.
            let _ = tx.rollback().await;
            Err(err)
        }
    }
}

async fn write_all(
    tx: &mut dyn StoreTx,
    submission: &ValidatedSubmission,
) -> Result<SubmissionReceipt, PersistError> {
    let resolved = identity::resolve(tx, &submission.submitter)
        .await
        .map_err(PersistError::at(PersistStep::ResolveSubmitter))?;

    let persisted = persister::persist(tx, &resolved.submitter, submission).await?;

    Ok(SubmissionReceipt {
        submitter: resolved.submitter,
        submitter_created: resolved.created,
        persisted,
    })
}
