use crate::models::user::DirectorySnapshot;
use chrono::{Days, NaiveDate};
use thiserror::Error;

/// Why a credential pair was rejected.
///
/// The ordering of the checks in [`validate`] is a contract: a blocked user
/// with a wrong password reports `UserBlocked`, never `InvalidPassword`.
/// Operators read these strings, so the wording is stable.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthReason {
    #[error("Invalid auth format")]
    MalformedCredential,

    #[error("User not found")]
    UserNotFound,

    #[error("User is blocked")]
    UserBlocked,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Account expired")]
    AccountExpired,

    #[error("Data limit exceeded")]
    QuotaExceeded,
}

/// Validate a raw `username:password` credential against a directory
/// snapshot. Pure; `today` is injected so expiry is deterministic in tests.
///
/// Checks run in strict short-circuit order, each terminal on failure:
/// credential shape, existence, block/active state, password, expiry, quota.
pub fn validate<'a>(
    auth: &'a str,
    snapshot: &DirectorySnapshot,
    today: NaiveDate,
) -> Result<&'a str, AuthReason> {
    let (username, password) = auth
        .split_once(':')
        .ok_or(AuthReason::MalformedCredential)?;

    let user = snapshot.get(username).ok_or(AuthReason::UserNotFound)?;

    if user.blocked || !user.is_active {
        return Err(AuthReason::UserBlocked);
    }

    if user.password.as_deref() != Some(password) {
        return Err(AuthReason::InvalidPassword);
    }

    if user.expiration_days > 0 {
        // A missing creation date counts from today, so the account cannot
        // be expired on its first sighting.
        let creation = user.account_creation_date.unwrap_or(today);
        match creation.checked_add_days(Days::new(u64::from(user.expiration_days))) {
            Some(expiry) if today < expiry => {}
            _ => return Err(AuthReason::AccountExpired),
        }
    }

    if user.max_download_bytes > 0 && user.used_bytes() >= user.max_download_bytes {
        return Err(AuthReason::QuotaExceeded);
    }

    Ok(username)
}
