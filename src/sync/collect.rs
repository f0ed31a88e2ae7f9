use crate::api::gateway::GatewayClient;
use crate::models::report::TrafficSample;
use std::collections::HashMap;
use tracing::{error, info};

/// Pull the cleared traffic counters and the online presence map from the
/// gateway. The two reads degrade independently: either failure is logged
/// and replaced by an empty result, so a presence outage never blocks the
/// traffic read or vice versa.
pub async fn collect(
    gateway: &GatewayClient,
    secret: &str,
) -> (Vec<TrafficSample>, HashMap<String, u32>) {
    let samples = match gateway.fetch_traffic(secret).await {
        Ok(samples) => {
            info!(users = samples.len(), "Collected traffic counters from gateway");
            samples
        }
        Err(e) => {
            error!(error = %e, "Failed to collect traffic from gateway");
            Vec::new()
        }
    };

    let presence = match gateway.fetch_online(secret).await {
        Ok(presence) => {
            info!(users = presence.len(), "Collected online clients from gateway");
            presence
        }
        Err(e) => {
            error!(error = %e, "Failed to collect online clients from gateway");
            HashMap::new()
        }
    };

    (samples, presence)
}
