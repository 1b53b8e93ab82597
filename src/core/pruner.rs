/// Retention pruner
///
/// Drops history older than a given number of days.

use crate::db::Database;
use crate::error::Result;
use crate::observability::Observer;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Default retention used by `cleanup`
pub const DEFAULT_MAX_AGE_DAYS: u32 = 90;

pub struct Pruner {
    db: Arc<Database>,
    observer: Arc<dyn Observer>,
}

impl Pruner {
    pub fn new(db: Arc<Database>, observer: Arc<dyn Observer>) -> Self {
        Self { db, observer }
    }

    /// Delete commands older than `max_age_days`; returns how many went
    pub async fn prune(&self, max_age_days: u32) -> Result<u64> {
        self.prune_before(cutoff(Utc::now(), max_age_days)).await
    }

    /// Delete commands recorded strictly before `cutoff`
    pub async fn prune_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        match self.db.delete_commands_before(cutoff).await {
            Ok(deleted) => {
                self.observer
                    .info(&format!("pruned {} command(s) older than {}", deleted, cutoff));
                Ok(deleted)
            }
            Err(e) => {
                self.observer.error(&format!("pruning failed: {}", e));
                Err(e)
            }
        }
    }
}

/// `now` minus whole days
pub fn cutoff(now: DateTime<Utc>, max_age_days: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(max_age_days))
}
