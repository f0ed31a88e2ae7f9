use crate::models::report::{
    ReportRecord, TrafficSample, STATUS_OFFLINE, STATUS_ONLINE, STATUS_ON_HOLD,
};
use crate::models::user::DirectorySnapshot;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

/// Combine a directory snapshot, a traffic-delta batch, and the online
/// presence map into the records to report. Pure and deterministic; `today`
/// is injected for the default-creation-date rule.
///
/// Per sample, in input order:
/// - dropped if the username is unknown to the panel;
/// - dropped if both deltas are zero and the user has no live connections,
///   unless the panel status is `On-hold` (On-hold users are always
///   reported so the panel can transition zero-usage accounts);
/// - status becomes `Online` on any traffic or any live connection,
///   otherwise the panel's own status passes through (`Offline` if unset);
/// - a creation date of `today` is attached only when traffic occurred and
///   the panel has none recorded.
pub fn reconcile(
    snapshot: &DirectorySnapshot,
    samples: &[TrafficSample],
    presence: &HashMap<String, u32>,
    today: NaiveDate,
) -> Vec<ReportRecord> {
    let mut records = Vec::new();

    for sample in samples {
        let Some(user) = snapshot.get(&sample.username) else {
            debug!(username = %sample.username, "Skipping sample, user not on panel");
            continue;
        };

        let has_traffic = sample.upload_delta > 0 || sample.download_delta > 0;
        let online_count = presence.get(&sample.username).copied().unwrap_or(0);
        let on_hold = user.status.as_deref() == Some(STATUS_ON_HOLD);
        if !has_traffic && online_count == 0 && !on_hold {
            debug!(username = %sample.username, "Skipping sample, no traffic");
            continue;
        }

        let status = if has_traffic || online_count > 0 {
            STATUS_ONLINE.to_string()
        } else {
            user.status
                .clone()
                .unwrap_or_else(|| STATUS_OFFLINE.to_string())
        };

        let account_creation_date = if has_traffic && user.account_creation_date.is_none() {
            Some(today)
        } else {
            None
        };

        records.push(ReportRecord {
            username: sample.username.clone(),
            upload_bytes: sample.upload_delta,
            download_bytes: sample.download_delta,
            online_count,
            status,
            account_creation_date,
        });
    }

    records
}
