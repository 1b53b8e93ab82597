// CLI module - command-line argument parsing
//
// Only parsing lives here; main.rs turns these into calls on the store.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Track and manage bash command history
#[derive(Parser, Debug)]
#[command(name = "bashtrack")]
#[command(version)]
#[command(
    about = "Track and manage bash command history",
    long_about = "Records every bash command in a SQLite database, with filtering and search."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a command to the database
    Record {
        /// The command line, as typed
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true, trailing_var_arg = true)]
        words: Vec<String>,

        /// Directory the command ran in (defaults to the current one)
        #[arg(long)]
        cwd: Option<PathBuf>,
    },

    /// List recent commands
    List {
        /// Number of commands to show
        #[arg(short, long, default_value_t = 20)]
        limit: i64,

        /// Only commands containing this text
        #[arg(short, long)]
        filter: Option<String>,

        /// Only commands run in a directory containing this text
        #[arg(short, long)]
        directory: Option<String>,

        /// Show each command's words
        #[arg(long)]
        words: bool,
    },

    /// Search commands by pattern
    Search {
        pattern: String,

        /// Show each command's words
        #[arg(long)]
        words: bool,
    },

    /// Show command statistics
    Stats,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show setup instructions
    Setup,

    /// Remove old commands
    Cleanup {
        /// Remove commands older than this many days
        #[arg(short, long, default_value_t = 90)]
        days: u32,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Add an exclude pattern
    AddExclude { pattern: String },

    /// Remove an exclude pattern
    RemoveExclude { pattern: String },
}
