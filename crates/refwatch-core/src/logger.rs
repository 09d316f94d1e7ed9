//! Logging interface passed explicitly to each component of a run.

/// Leveled log sink handed to the chain reader, PR extractor and notifier.
pub trait ActionLogger: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards every entry to the matching `tracing` macro.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ActionLogger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "refwatch", "{message}");
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "refwatch", "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "refwatch", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "refwatch", "{message}");
    }
}

#[cfg(feature = "test-util")]
pub use recording::{LogLevel, RecordingLogger};

#[cfg(feature = "test-util")]
mod recording {
    use std::sync::Mutex;

    use super::ActionLogger;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum LogLevel {
        Debug,
        Info,
        Warn,
        Error,
    }

    /// Keeps every entry in memory so tests can assert on what was logged.
    #[derive(Debug, Default)]
    pub struct RecordingLogger {
        entries: Mutex<Vec<(LogLevel, String)>>,
    }

    impl RecordingLogger {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn entries(&self) -> Vec<(LogLevel, String)> {
            self.entries.lock().map(|e| e.clone()).unwrap_or_default()
        }

        /// Messages logged at `level`, in order.
        pub fn at(&self, level: LogLevel) -> Vec<String> {
            self.entries()
                .into_iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, m)| m)
                .collect()
        }

        fn push(&self, level: LogLevel, message: &str) {
            if let Ok(mut entries) = self.entries.lock() {
                entries.push((level, message.to_string()));
            }
        }
    }

    impl ActionLogger for RecordingLogger {
        fn debug(&self, message: &str) {
            self.push(LogLevel::Debug, message);
        }

        fn info(&self, message: &str) {
            self.push(LogLevel::Info, message);
        }

        fn warn(&self, message: &str) {
            self.push(LogLevel::Warn, message);
        }

        fn error(&self, message: &str) {
            self.push(LogLevel::Error, message);
        }
    }
}
