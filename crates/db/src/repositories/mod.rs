//! Repository layer: one zero-sized struct per table.
//!
//! Every method is generic over [`sqlx::PgExecutor`], so the same query runs
//! against a pool or inside an open transaction (`&mut *tx`).

pub mod coords_repo;
pub mod image_repo;
pub mod level_repo;
pub mod pereval_repo;
pub mod user_repo;

pub use coords_repo::CoordsRepo;
pub use image_repo::ImageRepo;
pub use level_repo::LevelRepo;
pub use pereval_repo::PerevalRepo;
pub use user_repo::UserRepo;
