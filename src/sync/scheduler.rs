use crate::api::gateway::GatewayClient;
use crate::api::panel::PanelClient;
use crate::models::user::DirectorySnapshot;
use crate::sync::collect::collect;
use crate::sync::reconcile::reconcile;
use crate::sync::secret::load_secret;
use crate::utils::time::today;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Drives the collect -> reconcile -> report cycle on a fixed interval.
///
/// The loop is cooperative and single-flight: a cycle runs to completion
/// before the next tick is considered, and the stop signal is observed at
/// the top of the loop or during the sleep, never mid-cycle. A failed cycle
/// is logged and the loop proceeds to the next tick.
pub struct TrafficSync {
    panel: Arc<PanelClient>,
    gateway: GatewayClient,
    secret_path: PathBuf,
    interval: Duration,
}

impl TrafficSync {
    pub fn new(
        panel: Arc<PanelClient>,
        gateway: GatewayClient,
        secret_path: PathBuf,
        interval: Duration,
    ) -> Self {
        Self {
            panel,
            gateway,
            secret_path,
            interval,
        }
    }

    /// Run until `shutdown_rx` flips. The first cycle starts immediately.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(interval_seconds = self.interval.as_secs(), "Traffic sync started");

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.sync_once().await {
                        error!(error = %e, "Traffic sync cycle failed");
                    }
                }
                _ = shutdown_rx.changed() => {
                    info!("Traffic sync shutting down");
                    break;
                }
            }
        }
    }

    /// One full reconciliation cycle.
    async fn sync_once(&self) -> Result<()> {
        debug!("Starting traffic sync cycle");

        // Re-read per cycle so a rotated gateway secret is picked up.
        let secret = load_secret(&self.secret_path)?;

        let snapshot = DirectorySnapshot::from_records(self.panel.fetch_users().await?);
        if snapshot.is_empty() {
            warn!("No users fetched from panel, skipping cycle");
            return Ok(());
        }

        let (samples, presence) = collect(&self.gateway, &secret).await;
        let records = reconcile(&snapshot, &samples, &presence, today());

        info!(
            panel_users = snapshot.len(),
            samples = samples.len(),
            online_users = presence.len(),
            reported = records.len(),
            "Traffic sync cycle reconciled"
        );

        // Counters behind these records are already cleared on the gateway;
        // a failed report drops this cycle's data.
        self.panel.report_traffic(&records).await
    }
}
