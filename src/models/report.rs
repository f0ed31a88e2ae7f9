use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const STATUS_ONLINE: &str = "Online";
pub const STATUS_OFFLINE: &str = "Offline";
/// Panel-assigned status meaning "report usage even when zero".
pub const STATUS_ON_HOLD: &str = "On-hold";

/// One per-user traffic delta as read from the gateway.
///
/// The gateway clears its counters on read, so a sample is consumed exactly
/// once; a lost sample is indistinguishable from "no traffic".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrafficSample {
    pub username: String,
    pub upload_delta: u64,
    pub download_delta: u64,
}

/// Normalized usage record sent back to the panel.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportRecord {
    pub username: String,
    pub upload_bytes: u64,
    pub download_bytes: u64,
    pub online_count: u32,
    pub status: String,
    /// Attached only when traffic occurred and the panel has no recorded
    /// creation date for the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_creation_date: Option<NaiveDate>,
}
