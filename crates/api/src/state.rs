use std::sync::Arc;

use lotmap_core::store::LotStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Lot and map settings persistence (PostgreSQL or in-memory).
    pub store: Arc<dyn LotStore>,
    /// Server configuration (JWT settings are read by the auth extractor).
    pub config: Arc<ServerConfig>,
}
