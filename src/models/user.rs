use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;

/// A single user record as the panel reports it.
///
/// The panel sends loosely-populated objects, so every field beyond the
/// username has a documented default. Validation happens once here at the
/// deserialization boundary; downstream code works with typed fields only.
#[derive(Clone, Debug, Deserialize)]
pub struct PanelUser {
    #[serde(default)]
    pub username: String,
    /// Opaque secret, compared verbatim. Absent means no password can match.
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// 0 = no expiry.
    #[serde(default)]
    pub expiration_days: u32,
    #[serde(default)]
    pub account_creation_date: Option<NaiveDate>,
    /// 0 = unlimited.
    #[serde(default)]
    pub max_download_bytes: u64,
    /// Cumulative totals known to the panel; the panel may send null.
    #[serde(default)]
    pub upload_bytes: Option<u64>,
    #[serde(default)]
    pub download_bytes: Option<u64>,
    /// Opaque panel status string ("Online", "Offline", "On-hold", ...).
    #[serde(default)]
    pub status: Option<String>,
}

fn default_true() -> bool {
    true
}

impl PanelUser {
    /// Total bytes the panel has already accounted for this user.
    pub fn used_bytes(&self) -> u64 {
        self.upload_bytes.unwrap_or(0) + self.download_bytes.unwrap_or(0)
    }
}

/// Immutable point-in-time copy of the panel user directory, keyed by
/// username. Built atomically from one fetch and never partially updated.
#[derive(Clone, Debug, Default)]
pub struct DirectorySnapshot {
    users: HashMap<String, PanelUser>,
}

impl DirectorySnapshot {
    /// Build a snapshot from a fetched payload.
    ///
    /// Records without a username are silently dropped. Duplicate usernames
    /// resolve last-write-wins in payload order; the panel does not document
    /// that order, so nothing downstream may rely on which duplicate survives.
    pub fn from_records(records: Vec<PanelUser>) -> Self {
        let mut users = HashMap::with_capacity(records.len());
        for user in records {
            if user.username.is_empty() {
                continue;
            }
            users.insert(user.username.clone(), user);
        }
        Self { users }
    }

    pub fn get(&self, username: &str) -> Option<&PanelUser> {
        self.users.get(username)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_json(username: &str) -> serde_json::Value {
        serde_json::json!({ "username": username, "password": "pw" })
    }

    #[test]
    fn test_defaults_for_sparse_record() {
        let user: PanelUser = serde_json::from_value(user_json("alice")).unwrap();

        assert_eq!(user.username, "alice");
        assert!(!user.blocked);
        assert!(user.is_active);
        assert_eq!(user.expiration_days, 0);
        assert_eq!(user.max_download_bytes, 0);
        assert_eq!(user.used_bytes(), 0);
        assert!(user.account_creation_date.is_none());
        assert!(user.status.is_none());
    }

    #[test]
    fn test_null_byte_counters() {
        let user: PanelUser = serde_json::from_value(serde_json::json!({
            "username": "bob",
            "upload_bytes": null,
            "download_bytes": 42,
        }))
        .unwrap();

        assert_eq!(user.used_bytes(), 42);
    }

    #[test]
    fn test_creation_date_parses_calendar_date() {
        let user: PanelUser = serde_json::from_value(serde_json::json!({
            "username": "carol",
            "account_creation_date": "2024-03-01",
        }))
        .unwrap();

        assert_eq!(
            user.account_creation_date,
            Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
    }

    #[test]
    fn test_snapshot_drops_missing_usernames() {
        let records: Vec<PanelUser> = serde_json::from_value(serde_json::json!([
            { "username": "alice" },
            { "password": "orphan" },
        ]))
        .unwrap();

        let snapshot = DirectorySnapshot::from_records(records);
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains("alice"));
    }

    #[test]
    fn test_snapshot_duplicate_usernames_last_wins() {
        let records: Vec<PanelUser> = serde_json::from_value(serde_json::json!([
            { "username": "alice", "password": "first" },
            { "username": "alice", "password": "second" },
        ]))
        .unwrap();

        let snapshot = DirectorySnapshot::from_records(records);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot.get("alice").unwrap().password.as_deref(),
            Some("second")
        );
    }

    #[test]
    fn test_usernames_are_case_sensitive() {
        let snapshot = DirectorySnapshot::from_records(
            serde_json::from_value(serde_json::json!([{ "username": "Alice" }])).unwrap(),
        );

        assert!(snapshot.contains("Alice"));
        assert!(!snapshot.contains("alice"));
    }
}
