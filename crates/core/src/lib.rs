//! Domain core for crossing-report ("pereval") submissions.
//!
//! Holds the validation gate, the identity resolver, the composite persister
//! and the persistence port they write through. No HTTP or SQL lives here.

pub mod error;
pub mod identity;
pub mod memory;
pub mod models;
pub mod persister;
pub mod store;
pub mod submission;
pub mod types;
pub mod validation;
