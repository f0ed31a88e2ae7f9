use crate::models::report::ReportRecord;
use crate::models::user::PanelUser;
use crate::utils::time::now_iso8601;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Every call to the panel carries this timeout; a timeout is treated like
/// any other fetch failure by the callers.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the subscription panel: fetches the user directory and pushes
/// traffic report batches.
pub struct PanelClient {
    client: reqwest::Client,
    base_url: String,
    traffic_url: String,
    api_key: String,
}

/// The panel answers the directory fetch either as a flat list of user
/// objects or as a paginated envelope wrapping the same objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UsersPayload {
    Flat(Vec<PanelUser>),
    Paginated { results: Vec<PanelUser> },
}

impl UsersPayload {
    fn into_records(self) -> Vec<PanelUser> {
        match self {
            UsersPayload::Flat(records) => records,
            UsersPayload::Paginated { results } => results,
        }
    }
}

#[derive(Debug, Serialize)]
struct TrafficReport<'a> {
    timestamp: String,
    users: &'a [ReportRecord],
}

impl PanelClient {
    pub fn new(base_url: String, traffic_url: String, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            traffic_url,
            api_key,
        })
    }

    /// Fetch the current user directory from the panel.
    pub async fn fetch_users(&self) -> Result<Vec<PanelUser>> {
        let response = self
            .client
            .get(&self.base_url)
            .header("Authorization", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send directory request to panel")?;

        if !response.status().is_success() {
            bail!("Panel API returned status {}", response.status());
        }

        let payload = response
            .json::<UsersPayload>()
            .await
            .context("Failed to parse directory response from panel")?;

        Ok(payload.into_records())
    }

    /// Push one batch of usage records to the panel.
    ///
    /// An empty batch succeeds without a network call. Anything but a 2xx
    /// response fails with the response body in the error. No retry: the
    /// gateway counters behind these records are already cleared, so a
    /// failed delivery loses this cycle's data.
    pub async fn report_traffic(&self, records: &[ReportRecord]) -> Result<()> {
        if records.is_empty() {
            debug!("No traffic records to report");
            return Ok(());
        }

        let payload = TrafficReport {
            timestamp: now_iso8601(),
            users: records,
        };

        let response = self
            .client
            .post(&self.traffic_url)
            .header("Authorization", &self.api_key)
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .await
            .context("Failed to send traffic report to panel")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Panel traffic API returned status {status}: {body}");
        }

        info!(users = records.len(), "Traffic report delivered to panel");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::DirectorySnapshot;

    fn client() -> PanelClient {
        PanelClient::new(
            "http://127.0.0.1:9/users".to_string(),
            "http://127.0.0.1:9/traffic".to_string(),
            "test-api-key".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_panel_client_creation() {
        let _ = client();
    }

    #[tokio::test]
    async fn test_empty_report_succeeds_without_network() {
        // Endpoint is unreachable; an empty batch must not touch it.
        assert!(client().report_traffic(&[]).await.is_ok());
    }

    #[test]
    fn test_flat_and_paginated_payloads_are_equivalent() {
        let users = serde_json::json!([
            { "username": "alice", "password": "a", "blocked": false },
            { "username": "bob", "password": "b", "max_download_bytes": 100 },
        ]);

        let flat: UsersPayload = serde_json::from_value(users.clone()).unwrap();
        let paginated: UsersPayload =
            serde_json::from_value(serde_json::json!({ "results": users })).unwrap();

        let flat = DirectorySnapshot::from_records(flat.into_records());
        let paginated = DirectorySnapshot::from_records(paginated.into_records());

        assert_eq!(flat.len(), paginated.len());
        for name in ["alice", "bob"] {
            let a = flat.get(name).unwrap();
            let b = paginated.get(name).unwrap();
            assert_eq!(a.password, b.password);
            assert_eq!(a.max_download_bytes, b.max_download_bytes);
        }
    }

    #[test]
    fn test_report_payload_shape() {
        let records = vec![ReportRecord {
            username: "alice".to_string(),
            upload_bytes: 5,
            download_bytes: 7,
            online_count: 1,
            status: "Online".to_string(),
            account_creation_date: None,
        }];
        let payload = TrafficReport {
            timestamp: "2025-06-15T00:00:00+00:00".to_string(),
            users: &records,
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json["timestamp"].is_string());
        assert_eq!(json["users"][0]["username"], "alice");
        assert_eq!(json["users"][0]["online_count"], 1);
    }
}
