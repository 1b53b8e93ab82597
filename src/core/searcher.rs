/// Command searcher
///
/// Substring search over command text and individual words.

use crate::db::{CommandView, Database};
use crate::error::Result;
use crate::observability::Observer;
use std::sync::Arc;

/// Handles command searching
pub struct Searcher {
    db: Arc<Database>,
    observer: Arc<dyn Observer>,
}

impl Searcher {
    /// Create a new searcher instance
    pub fn new(db: Arc<Database>, observer: Arc<dyn Observer>) -> Self {
        Self { db, observer }
    }

    /// Search commands containing `pattern`
    ///
    /// # Arguments
    /// * `pattern` - Case-sensitive substring
    /// * `with_words` - Also load each command's word list
    ///
    /// # Returns
    /// * `Ok(Vec<CommandView>)` - Up to 50 distinct commands, newest first
    pub async fn search(&self, pattern: &str, with_words: bool) -> Result<Vec<CommandView>> {
        let results = self
            .db
            .search_commands(pattern, with_words)
            .await
            .map_err(|e| {
                self.observer.error(&format!("search for '{}' failed: {}", pattern, e));
                e
            })?;

        self.observer
            .info(&format!("search for '{}' matched {} command(s)", pattern, results.len()));

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ExclusionFilter, Recorder};
    use crate::observability::NullObserver;

    async fn setup(commands: &[&str]) -> Searcher {
        let db = Arc::new(Database::new_test().await.unwrap());
        let recorder = Recorder::new(
            Arc::clone(&db),
            ExclusionFilter::default(),
            Arc::new(NullObserver),
        );

        for cmd in commands {
            recorder.record(cmd, "/test").await.unwrap();
            // Keep timestamps strictly increasing
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        Searcher::new(db, Arc::new(NullObserver))
    }

    #[tokio::test]
    async fn test_search_newest_first() {
        let searcher = setup(&["docker build .", "git status", "docker ps"]).await;

        let results = searcher.search("docker", false).await.unwrap();
        let found: Vec<&str> = results.iter().map(|r| r.full_command.as_str()).collect();
        assert_eq!(found, vec!["docker ps", "docker build ."]);
    }

    #[tokio::test]
    async fn test_search_with_words() {
        let searcher = setup(&["kubectl get pods -A"]).await;

        let results = searcher.search("pods", true).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].words.clone().unwrap(),
            vec!["kubectl", "get", "pods", "-A"]
        );
    }

    #[tokio::test]
    async fn test_search_no_match() {
        let searcher = setup(&["npm install"]).await;

        assert!(searcher.search("cargo", false).await.unwrap().is_empty());
    }
}
