// bashtrack - keeps every bash command you type in a SQLite file
//
// This is the main entry point. Parses CLI args and dispatches to handlers.

mod cli;

use anyhow::Context;
use chrono::{DateTime, Local, Utc};
use bashtrack_lib::{
    config::{self, Config},
    core::{Aggregator, ExclusionFilter, Pruner, RecordOutcome, Recorder, Retriever, Searcher},
    db::{CommandView, ListFilter},
    observability::{self, Observer},
    Database, TracingObserver,
};
use clap::Parser;
use cli::{Cli, Commands, ConfigAction};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

// Everything is awaited in sequence; one thread is plenty
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    observability::init_logging();
    let observer: Arc<dyn Observer> = Arc::new(TracingObserver);

    let config_dir = config::config_dir()?;
    // A broken config file stops us here rather than being overwritten
    let config = Config::load(&config_dir)
        .with_context(|| format!("failed to load config from {}", config_dir.display()))?;

    match cli.command {
        Commands::Record { words, cwd } => {
            handle_record(&config, words, cwd, observer).await;
            Ok(())
        }
        Commands::List {
            limit,
            filter,
            directory,
            words,
        } => {
            let filter = ListFilter {
                limit,
                filter,
                directory,
                with_words: words,
            };
            handle_list(&config, filter, observer).await
        }
        Commands::Search { pattern, words } => handle_search(&config, &pattern, words, observer).await,
        Commands::Stats => handle_stats(&config, observer).await,
        Commands::Config { action } => handle_config(config, &config_dir, action),
        Commands::Setup => {
            print_setup_instructions();
            Ok(())
        }
        Commands::Cleanup { days } => handle_cleanup(&config, days, observer).await,
    }
}

// Runs from the prompt hook: whatever happens, the shell must not notice.
async fn handle_record(config: &Config, words: Vec<String>, cwd: Option<PathBuf>, observer: Arc<dyn Observer>) {
    let command = words.join(" ");

    let directory = cwd
        .or_else(|| env::current_dir().ok())
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let db = match open_database(config).await {
        Ok(db) => db,
        Err(e) => {
            observer.error(&format!("not recording, database unavailable: {:#}", e));
            return;
        }
    };

    let recorder = Recorder::new(
        Arc::clone(&db),
        ExclusionFilter::new(&config.exclude_patterns),
        Arc::clone(&observer),
    );

    // Errors were already reported by the recorder
    if let Ok(outcome @ (RecordOutcome::Empty | RecordOutcome::Excluded)) =
        recorder.record(&command, &directory).await
    {
        tracing::debug!(?outcome, "command skipped");
    }

    db.close().await;
}

async fn handle_list(config: &Config, filter: ListFilter, observer: Arc<dyn Observer>) -> anyhow::Result<()> {
    let db = open_database(config).await?;
    let retriever = Retriever::new(Arc::clone(&db), observer);

    let commands = retriever.list(&filter).await?;

    println!("Recent Commands (limit: {})", filter.limit);
    println!("{}", "-".repeat(80));
    for cmd in &commands {
        print_command(cmd);
    }

    db.close().await;
    Ok(())
}

async fn handle_search(
    config: &Config,
    pattern: &str,
    with_words: bool,
    observer: Arc<dyn Observer>,
) -> anyhow::Result<()> {
    let db = open_database(config).await?;
    let searcher = Searcher::new(Arc::clone(&db), observer);

    let results = searcher.search(pattern, with_words).await?;

    println!("Commands matching '{}':", pattern);
    println!("{}", "-".repeat(80));
    if results.is_empty() {
        println!("No commands found matching the pattern.");
    }
    for cmd in &results {
        print_command(cmd);
    }

    db.close().await;
    Ok(())
}

async fn handle_stats(config: &Config, observer: Arc<dyn Observer>) -> anyhow::Result<()> {
    let db = open_database(config).await?;
    let summary = Aggregator::new(Arc::clone(&db), observer).stats().await?;

    println!("Command Tracking Statistics");
    println!("{}", "=".repeat(40));
    println!("Total commands: {}", summary.total_commands);
    println!("Distinct words: {}\n", summary.total_words);

    if let (Some(earliest), Some(latest)) = (summary.earliest, summary.latest) {
        println!(
            "Date range: {} to {}",
            local_time(earliest, "%Y-%m-%d"),
            local_time(latest, "%Y-%m-%d")
        );
        if let Some(average) = summary.average_per_day {
            println!("Average per day: {:.1}", average);
        }
    }

    println!("\nTop Directories:");
    for entry in &summary.top_directories {
        println!("  {}: {}", entry.value, entry.count);
    }

    println!("\nMost Used Commands:");
    for entry in &summary.top_commands {
        println!("  {}: {}", entry.display_value(), entry.count);
    }

    println!("\nMost Used Words:");
    for entry in &summary.top_words {
        println!("  {}: {}", entry.value, entry.count);
    }

    db.close().await;
    Ok(())
}

fn handle_config(mut config: Config, config_dir: &std::path::Path, action: ConfigAction) -> anyhow::Result<()> {
    let config_path = config_dir.join(config::CONFIG_FILE);

    match action {
        ConfigAction::Show => {
            println!("Current Configuration:");
            println!("{}", "=".repeat(30));
            println!("Database: {}", config.database_path.display());
            println!("\nExclude Patterns:");
            for (i, pattern) in config.exclude_patterns.iter().enumerate() {
                println!("  {}. {}", i + 1, pattern);
            }
            let filter = ExclusionFilter::new(&config.exclude_patterns);
            for pattern in filter.invalid_patterns() {
                println!("  (invalid, ignored: {})", pattern);
            }
        }
        ConfigAction::AddExclude { pattern } => {
            if config.add_exclude_pattern(&pattern) {
                config.save(&config_path)?;
                println!("Added exclude pattern: {}", pattern);
            } else {
                println!("Pattern '{}' already exists", pattern);
            }
        }
        ConfigAction::RemoveExclude { pattern } => {
            if config.remove_exclude_pattern(&pattern) {
                config.save(&config_path)?;
                println!("Removed exclude pattern: {}", pattern);
            } else {
                println!("Pattern '{}' not found", pattern);
            }
        }
    }

    Ok(())
}

async fn handle_cleanup(config: &Config, days: u32, observer: Arc<dyn Observer>) -> anyhow::Result<()> {
    let db = open_database(config).await?;
    let deleted = Pruner::new(Arc::clone(&db), observer).prune(days).await?;

    println!("Removed {} commands older than {} days", deleted, days);

    db.close().await;
    Ok(())
}

async fn open_database(config: &Config) -> anyhow::Result<Arc<Database>> {
    let db = Database::new(&config.database_path)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    Ok(Arc::new(db))
}

// Stored in UTC, shown in the user's zone
fn local_time(timestamp: DateTime<Utc>, format: &str) -> String {
    timestamp.with_timezone(&Local).format(format).to_string()
}

fn print_command(cmd: &CommandView) {
    println!("[{}] {}", cmd.id, local_time(cmd.timestamp, "%Y-%m-%d %H:%M:%S"));
    println!("    Dir: {}", cmd.directory);
    println!("    Cmd: {}", cmd.full_command);
    if let Some(words) = &cmd.words {
        println!("    Words: {}", words.join(" | "));
    }
    println!();
}

fn print_setup_instructions() {
    let exec_path = env::current_exe()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| config::APP_NAME.to_string());

    println!("Bash Command Tracker Setup Instructions");
    println!("{}", "=".repeat(50));
    println!();
    println!("To start tracking your bash commands, add the following line to your ~/.bashrc file:");
    println!();
    println!(
        r#"export PROMPT_COMMAND="${{PROMPT_COMMAND:+$PROMPT_COMMAND$'\n'}}{} record \"$(history 1 | sed 's/^[ ]*[0-9]*[ ]*//')\"""#,
        exec_path
    );
    println!();
    println!("Then reload your bash configuration:");
    println!("  source ~/.bashrc");
    println!();
    println!("Note: The tool automatically excludes common commands and sensitive patterns.");
    println!("You can customize exclusions using 'config add-exclude' and 'config remove-exclude'.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_local_time_uses_local_offset() {
        let stored = Utc.with_ymd_and_hms(2025, 6, 1, 23, 0, 0).unwrap();
        let expected = Local.from_utc_datetime(&stored.naive_utc());

        assert_eq!(
            local_time(stored, "%Y-%m-%d %H:%M:%S"),
            expected.format("%Y-%m-%d %H:%M:%S").to_string()
        );
        assert_eq!(local_time(stored, "%Y-%m-%d"), expected.format("%Y-%m-%d").to_string());
    }
}
