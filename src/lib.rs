/// bashtrack library
///
/// Persistent shell command history: a normalized SQLite store with
/// exclusion filtering, search, statistics and retention.

pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod observability;

// Re-exports for convenience
pub use config::Config;
pub use db::Database;
pub use error::{RecallError, Result};
pub use observability::{Observer, TracingObserver};
