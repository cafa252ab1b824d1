//! Row structs for the submission tables.
//!
//! Each submodule holds a `FromRow` struct matching one table and a `From`
//! conversion into the corresponding `pereval_core::models` record.

pub mod coords;
pub mod image;
pub mod level;
pub mod pereval;
pub mod user;
