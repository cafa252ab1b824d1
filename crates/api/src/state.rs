use std::sync::Arc;

use pereval_core::store::PerevalStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend (PostgreSQL in production, in-memory in tests).
    pub store: Arc<dyn PerevalStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
