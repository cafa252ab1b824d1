//! Domain records for a crossing report and its owned children.
//!
//! Each persisted record has a matching `New*` input struct. The `New*`
//! structs are what the validation gate produces and what the store port
//! consumes; the persisted structs are what the store hands back.

use serde::Serialize;

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Submitter
// ---------------------------------------------------------------------------

/// The person who reported a crossing. Unique by `email`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submitter {
    pub id: DbId,
    pub email: String,
    pub last_name: String,
    pub first_name: String,
    pub patronymic: String,
    pub phone: String,
    pub created_at: Timestamp,
}

/// Contact details used to resolve or create a [`Submitter`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmitter {
    pub email: String,
    pub last_name: String,
    pub first_name: String,
    /// Empty string when the payload omitted `otc`.
    pub patronymic: String,
    pub phone: String,
}

// ---------------------------------------------------------------------------
// Crossing report
// ---------------------------------------------------------------------------

/// A crossing report ("pereval") row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pereval {
    pub id: DbId,
    pub user_id: DbId,
    pub beauty_title: String,
    pub title: String,
    pub other_titles: String,
    pub connect: String,
    pub add_time: Timestamp,
    pub created_at: Timestamp,
}

/// Top-level report fields of a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPereval {
    pub beauty_title: String,
    pub title: String,
    pub other_titles: String,
    pub connect: String,
    pub add_time: Timestamp,
}

// ---------------------------------------------------------------------------
// Children
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coords {
    pub id: DbId,
    pub pereval_id: DbId,
    pub latitude: f64,
    pub longitude: f64,
    pub height: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCoords {
    pub latitude: f64,
    pub longitude: f64,
    /// Metres above sea level.
    pub height: i32,
}

/// Difficulty grade per season (e.g. `1A`, `2B`). Empty means "not graded".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Level {
    pub id: DbId,
    pub pereval_id: DbId,
    pub winter: String,
    pub summer: String,
    pub spring: String,
    pub autumn: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLevel {
    pub winter: String,
    pub summer: String,
    pub spring: String,
    pub autumn: String,
}

/// An image attached to a crossing report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    pub id: DbId,
    pub pereval_id: DbId,
    pub title: String,
    #[serde(skip)]
    pub data: Vec<u8>,
    pub mime_type: String,
    pub width: i32,
    pub height: i32,
}

/// A decoded image entry. `mime_type`, `width` and `height` come from the
/// image header, not from the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct NewImage {
    pub title: String,
    pub data: Vec<u8>,
    pub mime_type: String,
    pub width: i32,
    pub height: i32,
}

// ---------------------------------------------------------------------------
// Composite
// ---------------------------------------------------------------------------

/// A payload that passed the validation gate, normalized and ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSubmission {
    pub submitter: NewSubmitter,
    pub pereval: NewPereval,
    pub coords: NewCoords,
    pub level: NewLevel,
    /// Always at least one entry.
    pub images: Vec<NewImage>,
}
