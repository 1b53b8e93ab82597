/// Schema manager
///
/// The schema is an ordered list of versioned steps. Each step commits
/// together with its row in `schema_migrations`, so a store is always at
/// some exact version and never halfway through one.

use crate::db::models::{format_timestamp, parse_timestamp};
use crate::error::{RecallError, Result};
use sqlx::sqlite::{SqliteConnection, SqlitePool};

const SCHEMA_SQL: &str = include_str!("../../database/schema.sql");
const FOLD_LEGACY_SQL: &str = include_str!("../../database/fold_legacy_words.sql");
const INDEXES_SQL: &str = include_str!("../../database/indexes.sql");

/// One row per word per command, no deduplication. Only ever read to migrate.
pub const LEGACY_WORDS_TABLE: &str = "command_words";

const CREATE_MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS schema_migrations (
        version INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
"#;

enum Step {
    Script(&'static str),
    FoldLegacyWords,
    CanonicalTimestamps,
}

struct Migration {
    version: i64,
    name: &'static str,
    step: Step,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "normalized_tables",
        step: Step::Script(SCHEMA_SQL),
    },
    Migration {
        version: 2,
        name: "fold_legacy_command_words",
        step: Step::FoldLegacyWords,
    },
    Migration {
        version: 3,
        name: "history_indexes",
        step: Step::Script(INDEXES_SQL),
    },
    Migration {
        version: 4,
        name: "canonical_timestamps",
        step: Step::CanonicalTimestamps,
    },
];

/// Latest version this build knows how to produce
pub fn latest_version() -> i64 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}

/// Apply every step not yet recorded in `schema_migrations`
///
/// Stops at the first failing step. That step is rolled back and reported
/// as [`RecallError::Migration`]; the steps before it stay committed.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(CREATE_MIGRATIONS_TABLE).execute(pool).await?;

    for migration in MIGRATIONS {
        if is_applied(pool, migration.version).await? {
            continue;
        }

        apply(pool, migration)
            .await
            .map_err(|source| RecallError::Migration {
                version: migration.version,
                name: migration.name,
                source,
            })?;
    }

    Ok(())
}

/// Highest applied version
pub async fn current_version(pool: &SqlitePool) -> Result<i64> {
    let version: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
        .fetch_one(pool)
        .await?;
    Ok(version)
}

async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT version FROM schema_migrations WHERE version = ?")
            .bind(version)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

async fn apply(pool: &SqlitePool, migration: &Migration) -> std::result::Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    match migration.step {
        Step::Script(script) => run_script(&mut tx, script).await?,
        Step::FoldLegacyWords => {
            if table_exists(&mut tx, LEGACY_WORDS_TABLE).await? {
                run_script(&mut tx, FOLD_LEGACY_SQL).await?;
            }
        }
        Step::CanonicalTimestamps => rewrite_timestamps(&mut tx).await?,
    }

    sqlx::query("INSERT INTO schema_migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(&mut *tx)
        .await?;

    // Dropping `tx` on any early return above rolls the whole step back
    tx.commit().await
}

async fn table_exists(conn: &mut SqliteConnection, name: &str) -> std::result::Result<bool, sqlx::Error> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(name)
            .fetch_one(&mut *conn)
            .await?;
    Ok(count > 0)
}

// Older versions stored `2006-01-02 15:04:05.999-07:00` in local offsets.
// Rewriting every row into the fixed-width UTC layout makes text comparison
// on `timestamp` chronological. Rows nothing can parse are left alone.
async fn rewrite_timestamps(conn: &mut SqliteConnection) -> std::result::Result<(), sqlx::Error> {
    let rows: Vec<(i64, String)> =
        sqlx::query_as("SELECT id, CAST(timestamp AS TEXT) FROM commands")
            .fetch_all(&mut *conn)
            .await?;

    for (id, raw) in rows {
        let Ok(parsed) = parse_timestamp(&raw) else {
            tracing::warn!(id, timestamp = %raw, "leaving unreadable timestamp as is");
            continue;
        };

        let canonical = format_timestamp(parsed);
        if canonical != raw {
            sqlx::query("UPDATE commands SET timestamp = ? WHERE id = ?")
                .bind(canonical)
                .bind(id)
                .execute(&mut *conn)
                .await?;
        }
    }

    Ok(())
}

// SQLite prepares one statement at a time, so scripts are split on ';'.
async fn run_script(conn: &mut SqliteConnection, script: &str) -> std::result::Result<(), sqlx::Error> {
    for statement in split_statements(script) {
        sqlx::query(statement).execute(&mut *conn).await?;
    }
    Ok(())
}

fn split_statements(script: &str) -> Vec<&str> {
    script
        .split(';')
        .map(str::trim)
        .filter(|chunk| {
            chunk
                .lines()
                .any(|line| !line.trim().is_empty() && !line.trim_start().starts_with("--"))
        })
        .collect()
}
