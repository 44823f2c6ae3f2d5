use std::sync::Arc;

use bounce_store::{RecordStore, SnapshotCache};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The configured record store adapter.
    pub store: Arc<dyn RecordStore>,
    /// Last-known-good list, served only when a caller asks for it.
    pub cache: Arc<SnapshotCache>,
    pub config: Arc<ServerConfig>,
}
