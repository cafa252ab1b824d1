//! Primitive aliases shared by every crate in the workspace.

/// Row identifier. Every table in the schema keys on a BIGSERIAL.
pub type DbId = i64;

/// Stored timestamps are always UTC (`TIMESTAMPTZ`).
pub type Timestamp = chrono::DateTime<chrono::Utc>;
