/// Aggregator
///
/// Summary statistics over the whole history.

use crate::db::{Database, Summary};
use crate::error::Result;
use crate::observability::Observer;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub const TOP_DIRECTORIES: i64 = 10;
pub const TOP_COMMANDS: i64 = 10;
pub const TOP_WORDS: i64 = 15;

pub struct Aggregator {
    db: Arc<Database>,
    observer: Arc<dyn Observer>,
}

impl Aggregator {
    pub fn new(db: Arc<Database>, observer: Arc<dyn Observer>) -> Self {
        Self { db, observer }
    }

    /// Build the summary
    ///
    /// Grouping always uses the full command text; shortening long commands
    /// is left to [`TopEntry::display_value`](crate::db::TopEntry::display_value).
    pub async fn stats(&self) -> Result<Summary> {
        self.collect().await.map_err(|e| {
            self.observer.error(&format!("computing stats failed: {}", e));
            e
        })
    }

    async fn collect(&self) -> Result<Summary> {
        let total_commands = self.db.count_commands().await?;
        let (earliest, latest) = self.db.timestamp_range().await?;

        Ok(Summary {
            total_commands,
            total_words: self.db.count_words().await?,
            earliest,
            latest,
            average_per_day: average_per_day(total_commands, earliest, latest),
            top_directories: self.db.top_directories(TOP_DIRECTORIES).await?,
            top_commands: self.db.top_commands(TOP_COMMANDS).await?,
            top_words: self.db.top_words(TOP_WORDS).await?,
        })
    }
}

/// Commands per whole day between the first and last record
///
/// `None` when there is no record or the span is under one day.
pub fn average_per_day(
    total: i64,
    earliest: Option<DateTime<Utc>>,
    latest: Option<DateTime<Utc>>,
) -> Option<f64> {
    let days = (latest? - earliest?).num_days();
    if days <= 0 {
        return None;
    }
    Some(total as f64 / days as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewCommand;
    use crate::observability::NullObserver;
    use chrono::{Duration, TimeZone};

    async fn setup() -> (Aggregator, Arc<Database>) {
        let db = Arc::new(Database::new_test().await.unwrap());
        (Aggregator::new(Arc::clone(&db), Arc::new(NullObserver)), db)
    }

    async fn insert_at(db: &Database, command: &str, directory: &str, at: DateTime<Utc>) {
        db.insert_command(&NewCommand {
            timestamp: at,
            directory: directory.to_string(),
            full_command: command.to_string(),
        })
        .await
        .unwrap();
    }

    #[test]
    fn test_average_per_day() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(average_per_day(10, Some(start), Some(start + Duration::days(4))), Some(2.5));
        // Less than a whole day
        assert_eq!(average_per_day(10, Some(start), Some(start + Duration::hours(23))), None);
        assert_eq!(average_per_day(0, None, None), None);
    }

    #[tokio::test]
    async fn test_empty_history() {
        let (aggregator, _) = setup().await;

        let summary = aggregator.stats().await.unwrap();
        assert_eq!(summary.total_commands, 0);
        assert!(summary.earliest.is_none());
        assert!(summary.latest.is_none());
        assert!(summary.average_per_day.is_none());
        assert!(summary.top_directories.is_empty());
        assert!(summary.top_words.is_empty());
    }

    #[tokio::test]
    async fn test_summary_counts_and_span() {
        let (aggregator, db) = setup().await;
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();

        insert_at(&db, "git status", "/repo", start).await;
        insert_at(&db, "git status", "/repo", start + Duration::days(1)).await;
        insert_at(&db, "make", "/repo", start + Duration::days(1)).await;
        insert_at(&db, "git pull", "/other", start + Duration::days(2)).await;

        let summary = aggregator.stats().await.unwrap();
        assert_eq!(summary.total_commands, 4);
        assert_eq!(summary.total_words, 4);
        assert_eq!(summary.earliest, Some(start));
        assert_eq!(summary.latest, Some(start + Duration::days(2)));
        assert_eq!(summary.average_per_day, Some(2.0));

        assert_eq!(summary.top_directories[0].value, "/repo");
        assert_eq!(summary.top_directories[0].count, 3);
        assert_eq!(summary.top_commands[0].value, "git status");
        assert_eq!(summary.top_commands[0].count, 2);
        assert_eq!(summary.top_words[0].value, "git");
        assert_eq!(summary.top_words[0].count, 3);
    }

    #[tokio::test]
    async fn test_long_commands_group_on_full_text() {
        let (aggregator, db) = setup().await;
        let prefix = "x".repeat(55);
        let now = Utc::now();

        // Same first 50 characters, different commands
        insert_at(&db, &format!("{} a", prefix), "/", now).await;
        insert_at(&db, &format!("{} b", prefix), "/", now).await;

        let summary = aggregator.stats().await.unwrap();
        assert_eq!(summary.top_commands.len(), 2);
        assert!(summary.top_commands.iter().all(|e| e.count == 1));
        assert_eq!(
            summary.top_commands[0].display_value(),
            format!("{}...", "x".repeat(50))
        );
    }

    #[tokio::test]
    async fn test_top_lists_are_capped() {
        let (aggregator, db) = setup().await;
        let now = Utc::now();

        for i in 0..20 {
            insert_at(&db, &format!("cmd{} w{}", i, i), &format!("/dir{}", i), now).await;
        }

        let summary = aggregator.stats().await.unwrap();
        assert_eq!(summary.top_directories.len() as i64, TOP_DIRECTORIES);
        assert_eq!(summary.top_commands.len() as i64, TOP_COMMANDS);
        assert_eq!(summary.top_words.len() as i64, TOP_WORDS);
    }
}
