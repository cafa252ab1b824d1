//! Composite persister: writes a crossing report and its owned children.

use crate::error::{PersistError, PersistStep};
use crate::models::{Coords, Image, Level, Pereval, Submitter, ValidatedSubmission};
use crate::store::StoreTx;

/// Rows created for one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedPereval {
    pub pereval: Pereval,
    pub coords: Coords,
    pub level: Level,
    pub images: Vec<Image>,
}

/// Insert the report bound to `submitter`, then its coords, level and every
/// image, in that order, through `tx`.
///
/// Does not commit. On error the caller must abandon the transaction; the
/// returned [`PersistError`] names the step that failed.
pub async fn persist(
    tx: &mut dyn StoreTx,
    submitter: &Submitter,
    submission: &ValidatedSubmission,
) -> Result<PersistedPereval, PersistError> {
    let pereval = tx
        .insert_pereval(submitter.id, &submission.pereval)
        .await
        .map_err(PersistError::at(PersistStep::CreatePereval))?;

    let coords = tx
        .insert_coords(pereval.id, &submission.coords)
        .await
        .map_err(PersistError::at(PersistStep::CreateCoords))?;

    let level = tx
        .insert_level(pereval.id, &submission.level)
        .await
        .map_err(PersistError::at(PersistStep::CreateLevel))?;

    let mut images = Vec::with_capacity(submission.images.len());
    for (index, entry) in submission.images.iter().enumerate() {
        let image = tx
            .insert_image(pereval.id, entry)
            .await
            .map_err(PersistError::at(PersistStep::CreateImage(index)))?;
        images.push(image);
    }

    Ok(PersistedPereval {
        pereval,
        coords,
        level,
        images,
    })
}
