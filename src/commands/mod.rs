pub mod export;
pub mod install;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::{self, Settings};
use crate::exec::Executor;
use crate::logging::Logger;
use crate::tasks::{self, Context, Task};

/// Resolve the repository root and load its settings.
///
/// # Errors
///
/// Returns an error if the root cannot be determined or `dot-install.toml`
/// is unreadable or invalid.
pub fn load_settings(
    global: &GlobalOpts,
    executor: &dyn Executor,
    log: &Logger,
) -> Result<Settings> {
    let version = option_env!("DOT_INSTALL_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    log.info(&format!("dot-install {version}"));

    log.stage("Loading configuration");
    let root = config::resolve_root(global.root.as_deref(), executor)?;
    log.info(&format!("root: {}", root.display()));

    let settings = Settings::load(&root)
        .with_context(|| format!("loading settings for {}", root.display()))?;
    log.debug(&format!("aur deps: {}", settings.aur_deps_path().display()));
    log.debug(&format!(
        "flatpak deps: {}",
        settings.flatpak_deps_path().display()
    ));
    log.debug(&format!("flatpak remote: {}", settings.flatpak_remote));
    Ok(settings)
}

/// Execute tasks in order, stopping at the first failure, then print the
/// summary.
///
/// # Errors
///
/// Returns the first task error.
pub fn run_tasks<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
    log: &Logger,
) -> Result<()> {
    let outcome = tasks
        .into_iter()
        .try_for_each(|task| tasks::execute(task, ctx));

    log.print_summary();
    outcome
}
