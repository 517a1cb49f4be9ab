//! Shared application state
//!
//! Handed to every handler. Holds no per-request data: the store pool is the
//! only process-wide resource and each request borrows a connection from it.

use crate::config::Config;
use crate::services::ArtifactResolver;
use crate::store::Store;
use std::sync::Arc;

/// State shared by all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Backing store
    pub store: Arc<Store>,
    /// Snapshot image resolver
    pub artifacts: Arc<ArtifactResolver>,
    /// Loaded configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Build state around an open store
    pub fn new(store: Arc<Store>, config: Config) -> Self {
        let artifacts = Arc::new(ArtifactResolver::new(
            store.clone(),
            config.artifacts.snapshot_root.clone(),
        ));
        Self {
            store,
            artifacts,
            config: Arc::new(config),
        }
    }
}
