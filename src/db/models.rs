/// Data models for database entities
///
/// Row types map straight onto tables; view types are what callers get back.

use crate::error::{RecallError, Result};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Default number of rows `list` returns
pub const DEFAULT_LIST_LIMIT: i64 = 20;

/// Display width for commands in summaries
pub const DISPLAY_WIDTH: usize = 50;

/// A recorded command as stored
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Command {
    pub id: i64,
    pub timestamp: String, // RFC 3339, microsecond precision, always UTC
    pub directory: String,
    pub full_command: String,
}

/// A command as handed back to callers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandView {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub directory: String,
    pub full_command: String,
    /// Tokens in position order, only filled when asked for
    pub words: Option<Vec<String>>,
}

impl TryFrom<Command> for CommandView {
    type Error = RecallError;

    fn try_from(row: Command) -> Result<Self> {
        Ok(Self {
            id: row.id,
            timestamp: parse_timestamp(&row.timestamp)?,
            directory: row.directory,
            full_command: row.full_command,
            words: None,
        })
    }
}

/// Input for recording a new command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCommand {
    pub timestamp: DateTime<Utc>,
    pub directory: String,
    pub full_command: String,
}

/// A distinct token
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Word {
    pub id: i64,
    pub word: String,
}

/// Filters for listing history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListFilter {
    pub limit: i64,
    /// Substring of the command text or of any of its words
    pub filter: Option<String>,
    /// Substring of the working directory
    pub directory: Option<String>,
    pub with_words: bool,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
            filter: None,
            directory: None,
            with_words: false,
        }
    }
}

/// A grouped value and how often it occurs
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct TopEntry {
    pub value: String,
    pub count: i64,
}

impl TopEntry {
    /// Value cut to [`DISPLAY_WIDTH`] characters with a trailing `...`
    pub fn display_value(&self) -> String {
        truncate_for_display(&self.value, DISPLAY_WIDTH)
    }
}

/// Aggregate view over the whole history
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Summary {
    pub total_commands: i64,
    pub total_words: i64,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
    /// Absent when the history spans less than one whole day
    pub average_per_day: Option<f64>,
    pub top_directories: Vec<TopEntry>,
    pub top_commands: Vec<TopEntry>,
    pub top_words: Vec<TopEntry>,
}

/// Split a command into its whitespace-delimited tokens
pub fn tokenize(command: &str) -> Vec<&str> {
    command.split_whitespace().collect()
}

/// Fixed-width UTC text, so that comparing stored strings compares instants
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
///
/// Accepts what [`format_timestamp`] writes plus the `2006-01-02 15:04:05.999-07:00`
/// layout left behind by older versions of the tool.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| RecallError::InvalidTimestamp(raw.to_string()))
}

/// Cut `text` to `width` characters, marking the cut with `...`
pub fn truncate_for_display(text: &str, width: usize) -> String {
    match text.char_indices().nth(width) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_tokenize_collapses_whitespace() {
        assert_eq!(tokenize("git  status\t--porcelain "), vec!["git", "status", "--porcelain"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_timestamp_text_orders_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2025, 3, 1, 9, 59, 59).unwrap();
        let later = earlier + chrono::Duration::microseconds(1);

        let (a, b) = (format_timestamp(earlier), format_timestamp(later));
        assert_eq!(a.len(), b.len());
        assert!(a < b);
        assert_eq!(parse_timestamp(&b).unwrap(), later);
    }

    #[test]
    fn test_parse_legacy_timestamp() {
        let parsed = parse_timestamp("2024-01-02 15:04:05.123456789-07:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 2, 22, 4, 5).unwrap() + chrono::Duration::nanoseconds(123_456_789));

        assert!(parse_timestamp("2024-01-02 15:04:05").is_ok());
        assert!(matches!(
            parse_timestamp("last tuesday"),
            Err(RecallError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_truncate_for_display() {
        let long = "x".repeat(60);
        let shown = truncate_for_display(&long, DISPLAY_WIDTH);
        assert_eq!(shown.len(), DISPLAY_WIDTH + 3);
        assert!(shown.ends_with("..."));

        assert_eq!(truncate_for_display("git status", DISPLAY_WIDTH), "git status");

        // Never splits a multi-byte character
        let accents = "é".repeat(55);
        assert_eq!(truncate_for_display(&accents, DISPLAY_WIDTH).chars().count(), DISPLAY_WIDTH + 3);
    }

    #[test]
    fn test_list_filter_default() {
        let filter = ListFilter::default();
        assert_eq!(filter.limit, DEFAULT_LIST_LIMIT);
        assert!(filter.filter.is_none());
        assert!(!filter.with_words);
    }
}
