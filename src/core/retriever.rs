/// Command retriever
///
/// Handles fetching commands from database with various filters.

use crate::db::{CommandView, Database, ListFilter};
use crate::error::Result;
use crate::observability::Observer;
use std::sync::Arc;

/// Handles command retrieval operations
pub struct Retriever {
    db: Arc<Database>,
    observer: Arc<dyn Observer>,
}

impl Retriever {
    /// Create a new retriever instance
    pub fn new(db: Arc<Database>, observer: Arc<dyn Observer>) -> Self {
        Self { db, observer }
    }

    /// Recent commands, newest first
    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<CommandView>> {
        self.db.list_commands(filter).await.map_err(|e| {
            self.observer.error(&format!("listing commands failed: {}", e));
            e
        })
    }

    /// Get command by ID, with its words
    pub async fn get_by_id(&self, id: i64) -> Result<Option<CommandView>> {
        let Some(mut view) = self.db.get_command_by_id(id).await? else {
            return Ok(None);
        };
        view.words = Some(self.db.command_words(id).await?);
        Ok(Some(view))
    }
}
