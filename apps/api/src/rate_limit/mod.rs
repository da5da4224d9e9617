//! Whole-query admission control.
//!
//! Authenticated users get a daily counter in Postgres that resets at UTC
//! date rollover; anonymous clients get an in-process cooldown between
//! submissions. Both checks run before any upstream dispatch. Neither is
//! transactional: the counter is a read-modify-write and the cooldown map
//! lives in one process, which is exactly as strict as this needs to be.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use crate::errors::AppError;

/// Searches an authenticated user may run per UTC day.
pub const REQUESTS_PER_DAY: u32 = 5;
/// Wait imposed on anonymous clients between two searches.
pub const REQUEST_COOLDOWN: Duration = Duration::from_secs(5 * 60);

// ────────────────────────────────────────────────────────────────────────────
// Anonymous cooldown
// ────────────────────────────────────────────────────────────────────────────

/// Tracks the last accepted submission per anonymous client id.
#[derive(Clone, Default)]
pub struct CooldownTracker {
    inner: Arc<Mutex<HashMap<String, Instant>>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits the submission and records its timestamp, or rejects it with
    /// the remaining wait in whole seconds, rounded up. A rejection leaves
    /// the recorded timestamp untouched, so retrying early never extends
    /// the wait. Expired entries are pruned on the way through.
    pub async fn check_and_record(&self, client_id: &str) -> Result<(), AppError> {
        let now = Instant::now();
        let mut last_accepted = self.inner.lock().await;

        last_accepted.retain(|_, t| now.duration_since(*t) < REQUEST_COOLDOWN);

        if let Some(last) = last_accepted.get(client_id) {
            let remaining = REQUEST_COOLDOWN - now.duration_since(*last);
            let mut retry_after_secs = remaining.as_secs();
            if remaining.subsec_nanos() > 0 {
                retry_after_secs += 1;
            }
            return Err(AppError::CooldownActive { retry_after_secs });
        }

        last_accepted.insert(client_id.to_string(), now);
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Authenticated daily quota
// ────────────────────────────────────────────────────────────────────────────

/// Counter write chosen by `quota_verdict` once a search is admitted.
#[derive(Debug, PartialEq, Eq)]
enum QuotaAction {
    StartCounter,
    BumpCounter,
}

/// Verdict over the current day's counter value. `None` means no counter row
/// exists for today: the user's first search of the day, or only stale rows
/// existed and the sweep removed them.
fn quota_verdict(count: Option<i32>) -> Result<QuotaAction, AppError> {
    match count {
        Some(count) if count >= REQUESTS_PER_DAY as i32 => Err(AppError::QuotaExceeded {
            limit: REQUESTS_PER_DAY,
        }),
        Some(_) => Ok(QuotaAction::BumpCounter),
        None => Ok(QuotaAction::StartCounter),
    }
}

/// Counts this query against the user's daily quota, rejecting once the
/// limit is reached. Stale counter rows from previous days are swept first;
/// the current day's counter is then read and bumped (or created).
pub async fn check_and_consume_quota(db: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    sqlx::query("DELETE FROM daily_requests WHERE request_date < CURRENT_DATE")
        .execute(db)
        .await?;

    let count: Option<i32> = sqlx::query_scalar(
        "SELECT request_count FROM daily_requests \
         WHERE user_id = $1 AND request_date = CURRENT_DATE",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    match quota_verdict(count)? {
        QuotaAction::BumpCounter => {
            sqlx::query(
                "UPDATE daily_requests \
                 SET request_count = request_count + 1, updated_at = NOW() \
                 WHERE user_id = $1 AND request_date = CURRENT_DATE",
            )
            .bind(user_id)
            .execute(db)
            .await?;
        }
        QuotaAction::StartCounter => {
            sqlx::query(
                "INSERT INTO daily_requests \
                 (id, user_id, request_date, request_count, created_at, updated_at) \
                 VALUES ($1, $2, CURRENT_DATE, 1, NOW(), NOW())",
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .execute(db)
            .await?;
        }
    }

    Ok(())
}
