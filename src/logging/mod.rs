//! Logging infrastructure for structured console and file output.

mod logger;
mod subscriber;
mod types;
mod utils;

pub use logger::Logger;
pub use subscriber::init_subscriber;
pub use types::{Log, TaskEntry, TaskStatus};

/// Create a [`Logger`] backed by an isolated per-thread tracing subscriber
/// writing to a log file inside a fresh temporary directory.
///
/// The returned guard must be kept alive for the duration of the test;
/// dropping it restores the previous thread-local dispatcher.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn isolated_logger() -> (Logger, tempfile::TempDir, tracing::dispatcher::DefaultGuard) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let path = tmp.path().join("test.log");
    let file_layer = subscriber::FileLayer::at(&path).expect("failed to create file layer");
    let log = Logger::with_log_file(Some(path));
    let subscriber =
        tracing_subscriber::registry().with(file_layer.with_filter(LevelFilter::DEBUG));
    let guard = tracing::dispatcher::set_default(&tracing::Dispatch::new(subscriber));
    (log, tmp, guard)
}

/// In-memory [`Log`] implementation for unit tests.
#[cfg(test)]
pub(crate) mod test_helpers {
    use std::sync::Mutex;

    use super::{Log, TaskStatus};

    /// Records every message with a level tag, e.g. `"simulate: would link"`.
    #[derive(Debug, Default)]
    pub struct RecordingLog {
        lines: Mutex<Vec<String>>,
    }

    impl RecordingLog {
        /// Create an empty recorder.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// All recorded lines in order.
        pub fn lines(&self) -> Vec<String> {
            self.lines
                .lock()
                .map_or_else(|_| Vec::new(), |guard| guard.clone())
        }

        /// Whether any recorded line contains `needle`.
        pub fn contains(&self, needle: &str) -> bool {
            self.lines().iter().any(|line| line.contains(needle))
        }

        fn push(&self, level: &str, msg: &str) {
            if let Ok(mut guard) = self.lines.lock() {
                guard.push(format!("{level}: {msg}"));
            }
        }
    }

    impl Log for RecordingLog {
        fn stage(&self, msg: &str) {
            self.push("stage", msg);
        }
        fn info(&self, msg: &str) {
            self.push("info", msg);
        }
        fn debug(&self, msg: &str) {
            self.push("debug", msg);
        }
        fn warn(&self, msg: &str) {
            self.push("warn", msg);
        }
        fn error(&self, msg: &str) {
            self.push("error", msg);
        }
        fn simulate(&self, msg: &str) {
            self.push("simulate", msg);
        }
        fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
            self.push("task", &format!("{name} {status:?} {}", message.unwrap_or("")));
        }
    }
}
