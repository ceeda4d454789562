use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger};
use crate::tasks::{self, Context, ExportSelection};

/// Run the export command.
///
/// # Errors
///
/// Returns an error if settings cannot be loaded or any selected export fails.
pub fn run(global: &GlobalOpts, selection: ExportSelection, log: &Arc<Logger>) -> Result<()> {
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

/// Run the selected export tasks against an existing context.
///
/// Exports always write; simulate mode has no effect here.
///
/// # Errors
///
/// Returns the first task error.
pub fn execute(selection: ExportSelection, ctx: &Context, log: &Logger) -> Result<()> {
    if ctx.simulate {
        log.warn("simulate has no effect on export; dependency files will be written");
    }
    let tasks = tasks::export_tasks(selection);
    super::run_tasks(tasks.iter().map(AsRef::as_ref), ctx, log)
}
