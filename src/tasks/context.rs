use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Settings;
use crate::exec::Executor;
use crate::logging::Log;

/// Shared context for task execution.
pub struct Context {
    /// Repository root, dependency file locations and Flatpak remote.
    pub settings: Settings,
    /// User's home directory, `None` when it cannot be determined.
    pub home: Option<PathBuf>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Report intended changes without applying them.
    pub simulate: bool,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("settings", &self.settings)
            .field("home", &self.home)
            .field("log", &"<dyn Log>")
            .field("simulate", &self.simulate)
            .field("executor", &self.executor)
            .finish()
    }
}

impl Context {
    /// Creates a new context for task execution.
    ///
    /// The home directory comes from `$HOME`; an unset or empty value is kept
    /// as `None` so only tasks that need it fail.
    #[must_use]
    pub fn new(
        settings: Settings,
        log: Arc<dyn Log>,
        simulate: bool,
        executor: Arc<dyn Executor>,
    ) -> Self {
        let home = std::env::var_os("HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self {
            settings,
            home,
            log,
            simulate,
            executor,
        }
    }
}
