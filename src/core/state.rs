// Application state (AppState)

use crate::core::config::Config;
use crate::stores::directory::DirectoryCache;
use std::sync::Arc;

/// Shared state for the authentication service.
///
/// Request handlers only ever touch the directory cache; the reconciliation
/// scheduler runs on its own clients and shares nothing mutable with this.
#[derive(Clone)]
pub struct AppState {
    /// Last known panel directory snapshot, refreshed per request.
    pub directory: Arc<DirectoryCache>,

    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, directory: DirectoryCache) -> Self {
        Self {
            directory: Arc::new(directory),
            config: Arc::new(config),
        }
    }
}
