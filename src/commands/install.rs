use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger};
use crate::tasks::{self, Context, InstallSelection};

/// Run the install command.
///
/// # Errors
///
/// Returns an error if settings cannot be loaded or any selected task fails.
pub fn run(global: &GlobalOpts, selection: InstallSelection, log: &Arc<Logger>) -> Result<()> {
    let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
    let settings = super::load_settings(global, executor.as_ref(), log)?;
    let ctx = Context::new(
        settings,
        Arc::clone(log) as Arc<dyn Log>,
        global.simulate,
        executor,
    );
    execute(selection, &ctx, log)
}

/// Run the selected install tasks against an existing context.
///
/// # Errors
///
/// Returns the first task error.
pub fn execute(selection: InstallSelection, ctx: &Context, log: &Logger) -> Result<()> {
    if ctx.simulate {
        log.info("simulate mode: no changes will be made");
    }
    let tasks = tasks::install_tasks(selection);
    super::run_tasks(tasks.iter().map(AsRef::as_ref), ctx, log)
}
