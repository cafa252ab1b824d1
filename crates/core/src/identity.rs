//! Identity resolver: find-or-create a submitter by email.

use crate::error::StoreError;
use crate::models::{NewSubmitter, Submitter};
use crate::store::StoreTx;

/// A submitter plus whether this call created it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSubmitter {
    pub submitter: Submitter,
    pub created: bool,
}

/// Return the submitter registered under `contact.email`, creating one if
/// none exists.
///
/// An existing submitter is returned unchanged; the other contact fields are
/// only used on creation. The lookup and insert are not serialized, so two
/// transactions racing on the same new email will see one of them fail with
/// [`StoreError::UniqueViolation`].
pub async fn resolve(
    tx: &mut dyn StoreTx,
    contact: &NewSubmitter,
) -> Result<ResolvedSubmitter, StoreError> {
    if let Some(submitter) = tx.find_submitter_by_email(&contact.email).await? {
        return Ok(ResolvedSubmitter {
            submitter,
            created: false,
        });
    }

    let submitter = tx.insert_submitter(contact).await?;
    Ok(ResolvedSubmitter {
        submitter,
        created: true,
    })
}
