// Records commands to the database
//
// Empty and excluded commands are dropped before anything touches the store.

use crate::core::filter::ExclusionFilter;
use crate::db::{tokenize, Database, NewCommand};
use crate::error::Result;
use crate::observability::Observer;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// What happened to a command handed to [`Recorder::record`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Stored under this command ID
    Recorded(i64),
    /// Nothing but whitespace
    Empty,
    /// Matched an exclusion pattern
    Excluded,
}

pub struct Recorder {
    db: Arc<Database>,
    filter: ExclusionFilter,
    observer: Arc<dyn Observer>,
}

impl Recorder {
    pub fn new(db: Arc<Database>, filter: ExclusionFilter, observer: Arc<dyn Observer>) -> Self {
        for pattern in filter.invalid_patterns() {
            observer.error(&format!("ignoring invalid exclude pattern '{}'", pattern));
        }

        Self {
            db,
            filter,
            observer,
        }
    }

    // Main recording function. Skips empty and excluded commands, stores the rest.
    pub async fn record(&self, command: &str, directory: &str) -> Result<RecordOutcome> {
        self.record_at(command, directory, Utc::now()).await
    }

    /// Same as [`record`](Self::record) with an explicit timestamp
    ///
    /// Used when importing history from elsewhere.
    pub async fn record_at(
        &self,
        command: &str,
        directory: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<RecordOutcome> {
        if command.trim().is_empty() || tokenize(command).is_empty() {
            return Ok(RecordOutcome::Empty);
        }

        if self.filter.is_excluded(command) {
            return Ok(RecordOutcome::Excluded);
        }

        // Identical text recorded twice is two rows: history, not a set
        let input = NewCommand {
            timestamp,
            directory: directory.to_string(),
            full_command: command.to_string(),
        };

        match self.db.insert_command(&input).await {
            Ok(id) => {
                self.observer.info(&format!("recorded command {} in {}", id, directory));
                Ok(RecordOutcome::Recorded(id))
            }
            Err(e) => {
                self.observer.error(&format!("failed to record '{}': {}", command, e));
                Err(e)
            }
        }
    }

    /// Batch record multiple commands
    ///
    /// Useful for importing history. A failure is reported and skipped.
    pub async fn record_batch(
        &self,
        commands: Vec<(String, String, DateTime<Utc>)>, // (command, directory, timestamp)
    ) -> Result<Vec<i64>> {
        let mut ids = Vec::new();

        for (command, directory, timestamp) in commands {
            // record_at already reported the error
            if let Ok(RecordOutcome::Recorded(id)) = self.record_at(&command, &directory, timestamp).await {
                ids.push(id);
            }
        }

        Ok(ids)
    }
}
