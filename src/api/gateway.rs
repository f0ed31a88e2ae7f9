use crate::models::report::TrafficSample;
use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the traffic gateway's stats API.
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, base_url })
    }

    /// Read and clear the per-user traffic counters.
    ///
    /// The read is destructive: the gateway zeroes each counter once it is
    /// delivered, so a response dropped after a successful clear is an
    /// unrecoverable data-loss window. Sample order follows the gateway's
    /// map order and is preserved through to the report batch.
    pub async fn fetch_traffic(&self, secret: &str) -> Result<Vec<TrafficSample>> {
        let url = format!("{}/traffic?clear=1", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", secret)
            .send()
            .await
            .context("Failed to send traffic request to gateway")?;

        if !response.status().is_success() {
            bail!("Gateway traffic API returned status {}", response.status());
        }

        let counters = response
            .json::<Map<String, Value>>()
            .await
            .context("Failed to parse traffic response from gateway")?;

        Ok(samples_from_counters(counters))
    }

    /// Read current per-user connection counts. Non-destructive.
    pub async fn fetch_online(&self, secret: &str) -> Result<HashMap<String, u32>> {
        let url = format!("{}/online", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", secret)
            .send()
            .await
            .context("Failed to send online request to gateway")?;

        if !response.status().is_success() {
            bail!("Gateway online API returned status {}", response.status());
        }

        response
            .json::<HashMap<String, u32>>()
            .await
            .context("Failed to parse online response from gateway")
    }
}

/// Normalize the gateway's `username -> {"tx", "rx"}` map into samples,
/// keeping map order. Missing or non-numeric counters count as zero.
fn samples_from_counters(counters: Map<String, Value>) -> Vec<TrafficSample> {
    counters
        .into_iter()
        .map(|(username, stats)| TrafficSample {
            username,
            upload_delta: counter(&stats, "tx"),
            download_delta: counter(&stats, "rx"),
        })
        .collect()
}

fn counter(stats: &Value, key: &str) -> u64 {
    stats.get(key).and_then(Value::as_u64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_client_creation() {
        assert!(GatewayClient::new("http://127.0.0.1:25413".to_string()).is_ok());
    }

    #[test]
    fn test_samples_preserve_map_order() {
        let counters: Map<String, Value> = serde_json::from_str(
            r#"{
                "zed": {"tx": 1, "rx": 2},
                "alice": {"tx": 3, "rx": 4},
                "mid": {"tx": 5, "rx": 6}
            }"#,
        )
        .unwrap();

        let samples = samples_from_counters(counters);
        let names: Vec<&str> = samples.iter().map(|s| s.username.as_str()).collect();
        assert_eq!(names, vec!["zed", "alice", "mid"]);
        assert_eq!(samples[1].upload_delta, 3);
        assert_eq!(samples[1].download_delta, 4);
    }

    #[test]
    fn test_missing_counters_default_to_zero() {
        let counters: Map<String, Value> =
            serde_json::from_str(r#"{"alice": {"tx": 7}, "bob": {}}"#).unwrap();

        let samples = samples_from_counters(counters);
        assert_eq!(samples[0].upload_delta, 7);
        assert_eq!(samples[0].download_delta, 0);
        assert_eq!(samples[1].upload_delta, 0);
        assert_eq!(samples[1].download_delta, 0);
    }

    #[test]
    fn test_malformed_counter_objects_are_tolerated() {
        let counters: Map<String, Value> =
            serde_json::from_str(r#"{"alice": {"tx": "lots", "rx": -1}}"#).unwrap();

        let samples = samples_from_counters(counters);
        assert_eq!(samples[0].upload_delta, 0);
        assert_eq!(samples[0].download_delta, 0);
    }
}
