/// Observability
///
/// Components never reach for a global logger. They get an [`Observer`]
/// at construction time; the binary hands them a [`TracingObserver`].

use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "BASHTRACK_LOG";

/// Something that wants to hear about what the store is doing
pub trait Observer: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn info(&self, message: &str) {
        tracing::info!(target: "bashtrack", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "bashtrack", "{}", message);
    }
}

/// Drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn info(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

/// Keeps messages in memory, mostly useful in tests
#[derive(Debug, Default)]
pub struct MemoryObserver {
    infos: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl MemoryObserver {
    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

impl Observer for MemoryObserver {
    fn info(&self, message: &str) {
        if let Ok(mut infos) = self.infos.lock() {
            infos.push(message.to_string());
        }
    }

    fn error(&self, message: &str) {
        if let Ok(mut errors) = self.errors.lock() {
            errors.push(message.to_string());
        }
    }
}

/// Install the process-wide subscriber
///
/// Logs go to stderr so the prompt hook never pollutes stdout. Defaults to
/// `warn`; set `BASHTRACK_LOG=info` (or any `EnvFilter` directive) for more.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    // A second init (tests, embedding) is not an error worth surfacing
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_memory_observer_keeps_messages_apart() {
        let observer = MemoryObserver::default();
        observer.info("recorded");
        observer.error("disk full");

        assert_eq!(observer.infos(), vec!["recorded"]);
        assert_eq!(observer.errors(), vec!["disk full"]);
    }

    #[test]
    fn test_observers_are_object_safe() {
        let observers: Vec<Arc<dyn Observer>> = vec![
            Arc::new(TracingObserver),
            Arc::new(NullObserver),
            Arc::new(MemoryObserver::default()),
        ];
        for observer in observers {
            observer.info("hello");
        }
    }
}
