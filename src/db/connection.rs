/// Database connection management
///
/// One process, one writer: the pool holds a single long-lived connection.

use crate::db::schema;
use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// The hook runs once per prompt, so one connection is all we ever use
const MAX_CONNECTIONS: u32 = 1;

/// How long a second writer waits for the lock before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

impl Database {
    /// Open (or create) the history database and bring its schema up to date
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    ///
    /// # Returns
    /// * `Ok(Database)` - Store is open and fully migrated
    /// * `Err(RecallError)` - If connecting or any migration step fails
    ///
    /// # Examples
    /// ```no_run
    /// use bashtrack_lib::db::Database;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let db = Database::new("/home/me/.bashtrack/commands.db").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT)
            .disable_statement_logging();

        let pool = Self::pool_options().connect_with(options).await?;

        let db = Self {
            pool: Arc::new(pool),
            db_path,
        };

        db.ensure_schema().await?;

        Ok(db)
    }

    /// Create a test database in memory
    ///
    /// Used for testing. Creates a fresh database for each test.
    #[cfg(test)]
    pub async fn new_test() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = Self::pool_options().connect_with(options).await?;

        let db = Self {
            pool: Arc::new(pool),
            db_path: PathBuf::from(":memory:"),
        };

        db.ensure_schema().await?;

        Ok(db)
    }

    // An in-memory database lives and dies with its connection, so the
    // single connection must never be reaped.
    fn pool_options() -> SqlitePoolOptions {
        SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .min_connections(MAX_CONNECTIONS)
            .idle_timeout(None)
            .max_lifetime(None)
    }

    /// Apply every pending schema step
    ///
    /// Safe to call repeatedly; an up-to-date store is left untouched.
    pub async fn ensure_schema(&self) -> Result<()> {
        schema::ensure_schema(self.pool()).await
    }

    /// Highest applied schema step, 0 for a store that was never migrated
    pub async fn schema_version(&self) -> Result<i64> {
        schema::current_version(self.pool()).await
    }

    /// Get reference to the connection pool
    ///
    /// Used internally by query modules.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Close all connections in the pool
    ///
    /// Should be called on application shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
