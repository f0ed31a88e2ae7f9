use crate::api::panel::PanelClient;
use crate::models::user::DirectorySnapshot;
use std::sync::{Arc, RwLock};
use tracing::{error, info};

/// Process-wide cache of the most recently fetched directory snapshot.
///
/// `refresh` replaces the snapshot atomically; readers always observe either
/// the old snapshot or the fully-new one, never a mix. The cache is a
/// best-effort fallback for panel outages, not a source of truth.
pub struct DirectoryCache {
    panel: Arc<PanelClient>,
    current: RwLock<Arc<DirectorySnapshot>>,
}

impl DirectoryCache {
    pub fn new(panel: Arc<PanelClient>) -> Self {
        Self {
            panel,
            current: RwLock::new(Arc::new(DirectorySnapshot::default())),
        }
    }

    /// Fetch a fresh snapshot from the panel.
    ///
    /// On success the cached snapshot is replaced and the new one returned.
    /// Any fetch failure is logged and the previous snapshot returned
    /// (empty if none was ever fetched); callers never see the error.
    pub async fn refresh(&self) -> Arc<DirectorySnapshot> {
        match self.panel.fetch_users().await {
            Ok(records) => {
                let snapshot = Arc::new(DirectorySnapshot::from_records(records));
                info!(users = snapshot.len(), "Fetched users from panel");
                self.install(Arc::clone(&snapshot));
                snapshot
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch users from panel, serving last snapshot");
                self.snapshot()
            }
        }
    }

    /// Replace the cached snapshot. Single short-held write lock.
    pub fn install(&self, snapshot: Arc<DirectorySnapshot>) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = snapshot;
    }

    /// The last known snapshot without touching the network.
    pub fn snapshot(&self) -> Arc<DirectorySnapshot> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }
}
