/// Database module for bashtrack
///
/// Handles all database operations using SQLite and sqlx:
/// the versioned schema, the atomic write path and the read queries.

pub mod connection;
pub mod models;
pub mod queries;
pub mod schema;

pub use connection::Database;
pub use models::*;
pub use queries::SEARCH_LIMIT;
