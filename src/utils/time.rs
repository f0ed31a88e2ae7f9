use chrono::{Local, NaiveDate};

/// Calendar date used for creation-date defaulting and expiry checks.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Capture timestamp for traffic report batches.
pub fn now_iso8601() -> String {
    Local::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_today_is_plausible() {
        let date = today();
        assert!(date > NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert!(date < NaiveDate::from_ymd_opt(2100, 1, 1).unwrap());
    }

    #[test]
    fn test_now_iso8601_round_trips() {
        let stamp = now_iso8601();
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok());
    }
}
