//! Account lockout policy
//!
//! Pure state machine over `(login_attempts, lock_until)`: five consecutive
//! failed password checks lock the account for two hours. The lock clears
//! by itself once the window passes; a successful login resets the counter.
//!
//! These functions only decide; persistence of the transition is the user
//! repository's atomic `record_failed_login` / `reset_login_attempts`.

use chrono::{DateTime, Duration, Utc};

/// Failed attempts that trigger a lock
pub const MAX_FAILED_ATTEMPTS: i32 = 5;

/// How long a locked account stays locked
pub fn lockout_duration() -> Duration {
    Duration::hours(2)
}

/// Outcome of registering one more failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureOutcome {
    pub login_attempts: i32,
    pub lock_until: Option<DateTime<Utc>>,
}

/// Whether the lockout window is active.
///
/// Must be consulted BEFORE password verification so a locked account
/// reveals nothing about password correctness.
pub fn is_locked(lock_until: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    matches!(lock_until, Some(until) if until > now)
}

/// Apply one failed password check to the current attempt counter.
///
/// The lock engages exactly when the updated counter reaches the
/// threshold; below it, any existing (stale) lock timestamp is left alone.
pub fn register_failure(login_attempts: i32, now: DateTime<Utc>) -> FailureOutcome {
    let attempts = login_attempts + 1;
    let lock_until = if attempts >= MAX_FAILED_ATTEMPTS {
        Some(now + lockout_duration())
    } else {
        None
    };
    FailureOutcome {
        login_attempts: attempts,
        lock_until,
    }
}
