use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Shape of the gateway's own config file, reduced to the one field we need.
#[derive(Debug, Deserialize)]
struct GatewayConfig {
    #[serde(rename = "trafficStats", default)]
    traffic_stats: Option<TrafficStats>,
}

#[derive(Debug, Deserialize)]
struct TrafficStats {
    #[serde(default)]
    secret: Option<String>,
}

/// Read `trafficStats.secret` from the gateway config file.
///
/// Re-read once per cycle so a rotated secret is picked up without a
/// restart. Fails when the file is unreadable, not JSON, or the key is
/// missing or empty.
pub fn load_secret(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read gateway config file: {}", path.display()))?;

    let config: GatewayConfig =
        serde_json::from_str(&content).context("Failed to parse gateway config file")?;

    config
        .traffic_stats
        .and_then(|stats| stats.secret)
        .filter(|secret| !secret.is_empty())
        .context("trafficStats.secret not found in gateway config")
}
