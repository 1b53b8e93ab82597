/// SQL query functions for database operations
///
/// Substring matching uses `instr()` rather than `LIKE`: it is case-sensitive
/// and treats `%` and `_` in user input literally.

use crate::db::models::*;
use crate::db::Database;
use crate::error::{RecallError, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{Sqlite, SqliteConnection};
use sqlx::QueryBuilder;

/// Hard cap on search results
pub const SEARCH_LIMIT: i64 = 50;

const SELECT_COMMANDS: &str =
    "SELECT c.id, c.timestamp, c.directory, c.full_command FROM commands c WHERE 1 = 1";

impl Database {
    /// Store a command with all of its words, atomically
    ///
    /// The command row, any new vocabulary and one position row per token
    /// are written in a single transaction; on error nothing is kept.
    ///
    /// # Returns
    /// * `Ok(i64)` - The new command ID
    /// * `Err(RecallError)` - If the command has no words or the write fails
    pub async fn insert_command(&self, input: &NewCommand) -> Result<i64> {
        let words = tokenize(&input.full_command);
        if words.is_empty() {
            return Err(RecallError::Generic(
                "refusing to store a command without words".to_string(),
            ));
        }

        let mut tx = self.pool().begin().await?;

        let command_id: i64 = sqlx::query_scalar(
            "INSERT INTO commands (timestamp, directory, full_command) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(format_timestamp(input.timestamp))
        .bind(&input.directory)
        .bind(&input.full_command)
        .fetch_one(&mut *tx)
        .await?;

        for (position, word) in words.iter().enumerate() {
            let word_id = upsert_word(&mut tx, word).await?;

            sqlx::query(
                "INSERT INTO command_word_positions (command_id, word_id, position) VALUES (?, ?, ?)",
            )
            .bind(command_id)
            .bind(word_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(command_id)
    }

    /// Most recent commands matching the filter, newest first
    pub async fn list_commands(&self, filter: &ListFilter) -> Result<Vec<CommandView>> {
        let mut views = self
            .find_commands(
                filter.filter.as_deref(),
                filter.directory.as_deref(),
                filter.limit,
            )
            .await?;

        if filter.with_words {
            self.attach_words(&mut views).await?;
        }

        Ok(views)
    }

    /// Commands whose text or words contain `pattern`, newest first
    ///
    /// Capped at [`SEARCH_LIMIT`] results.
    pub async fn search_commands(&self, pattern: &str, with_words: bool) -> Result<Vec<CommandView>> {
        let mut views = self.find_commands(Some(pattern), None, SEARCH_LIMIT).await?;

        if with_words {
            self.attach_words(&mut views).await?;
        }

        Ok(views)
    }

    /// Get command by ID
    pub async fn get_command_by_id(&self, id: i64) -> Result<Option<CommandView>> {
        let command = sqlx::query_as::<_, Command>(
            "SELECT id, timestamp, directory, full_command FROM commands WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        command.map(CommandView::try_from).transpose()
    }

    /// Words of a command in token order
    pub async fn command_words(&self, command_id: i64) -> Result<Vec<String>> {
        let words = sqlx::query_scalar::<_, String>(
            r#"
            SELECT w.word
            FROM command_word_positions p
            JOIN words w ON w.id = p.word_id
            WHERE p.command_id = ?
            ORDER BY p.position ASC
            "#,
        )
        .bind(command_id)
        .fetch_all(self.pool())
        .await?;

        Ok(words)
    }

    /// Total number of recorded commands
    pub async fn count_commands(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM commands")
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    /// Size of the vocabulary
    pub async fn count_words(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM words")
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    /// Earliest and latest timestamps, both `None` on an empty history
    pub async fn timestamp_range(&self) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
        // Text that doesn't start with a year would sort after every real date
        let (oldest, newest): (Option<String>, Option<String>) = sqlx::query_as(
            "SELECT MIN(timestamp), MAX(timestamp) FROM commands WHERE timestamp GLOB '[0-9][0-9][0-9][0-9]-*'",
        )
        .fetch_one(self.pool())
        .await?;

        Ok((readable_bound(oldest), readable_bound(newest)))
    }

    /// Directories with the most commands
    pub async fn top_directories(&self, limit: i64) -> Result<Vec<TopEntry>> {
        let entries = sqlx::query_as::<_, TopEntry>(
            r#"
            SELECT directory AS value, COUNT(*) AS count
            FROM commands
            GROUP BY directory
            ORDER BY count DESC, value ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(entries)
    }

    /// Most repeated full command lines
    pub async fn top_commands(&self, limit: i64) -> Result<Vec<TopEntry>> {
        let entries = sqlx::query_as::<_, TopEntry>(
            r#"
            SELECT full_command AS value, COUNT(*) AS count
            FROM commands
            GROUP BY full_command
            ORDER BY count DESC, value ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(entries)
    }

    /// Most used words, counting every occurrence
    pub async fn top_words(&self, limit: i64) -> Result<Vec<TopEntry>> {
        let entries = sqlx::query_as::<_, TopEntry>(
            r#"
            SELECT w.word AS value, COUNT(*) AS count
            FROM command_word_positions p
            JOIN words w ON w.id = p.word_id
            GROUP BY w.id
            ORDER BY count DESC, value ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(entries)
    }

    /// Delete commands recorded strictly before `cutoff`
    ///
    /// Position rows go with them through `ON DELETE CASCADE`; words stay.
    pub async fn delete_commands_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM commands WHERE timestamp < ?")
            .bind(format_timestamp(cutoff))
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected())
    }

    async fn find_commands(
        &self,
        text: Option<&str>,
        directory: Option<&str>,
        limit: i64,
    ) -> Result<Vec<CommandView>> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_COMMANDS);

        if let Some(text) = text.filter(|t| !t.is_empty()) {
            query
                .push(" AND (instr(c.full_command, ")
                .push_bind(text.to_string())
                .push(") > 0 OR EXISTS (SELECT 1 FROM command_word_positions p JOIN words w ON w.id = p.word_id WHERE p.command_id = c.id AND instr(w.word, ")
                .push_bind(text.to_string())
                .push(") > 0))");
        }

        if let Some(directory) = directory.filter(|d| !d.is_empty()) {
            query
                .push(" AND instr(c.directory, ")
                .push_bind(directory.to_string())
                .push(") > 0");
        }

        query
            .push(" ORDER BY c.timestamp DESC, c.id DESC LIMIT ")
            .push_bind(limit.max(0));

        let rows = query
            .build_query_as::<Command>()
            .fetch_all(self.pool())
            .await?;

        // One unreadable row shouldn't hide the rest of the history
        let views = rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                match CommandView::try_from(row) {
                    Ok(view) => Some(view),
                    Err(e) => {
                        tracing::warn!(id, error = %e, "skipping command with unreadable timestamp");
                        None
                    }
                }
            })
            .collect();

        Ok(views)
    }

    async fn attach_words(&self, views: &mut [CommandView]) -> Result<()> {
        for view in views.iter_mut() {
            view.words = Some(self.command_words(view.id).await?);
        }
        Ok(())
    }
}

// Insert the word unless the UNIQUE constraint says it already exists,
// then fall back to reading the existing id.
async fn upsert_word(conn: &mut SqliteConnection, word: &str) -> Result<i64> {
    let inserted: Option<i64> = sqlx::query_scalar(
        "INSERT INTO words (word) VALUES (?) ON CONFLICT(word) DO NOTHING RETURNING id",
    )
    .bind(word)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(id) = inserted {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM words WHERE word = ?")
        .bind(word)
        .fetch_one(&mut *conn)
        .await?;

    Ok(id)
}

fn readable_bound(raw: Option<String>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match parse_timestamp(&raw) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(timestamp = %raw, error = %e, "ignoring unreadable timestamp bound");
            None
        }
    }
}
