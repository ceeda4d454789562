//! Named, ordered tasks that orchestrate resource changes.
mod context;
pub mod dotfiles;
pub mod packages;

pub use context::Context;

use anyhow::Result;

use crate::logging::TaskStatus;

/// Outcome of a task that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Task completed and applied its changes.
    Ok,
    /// Task had nothing to do.
    Skipped(String),
    /// Simulate mode: changes were reported, not applied.
    Simulated,
}

/// A named, executable task.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task fails to execute, such as when system commands
    /// fail, file operations are not permitted, or inputs are missing.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// Which install actions were requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallSelection {
    /// Reconcile `~/.config` against the repository.
    pub dotfiles: bool,
    /// Install the AUR dependency list.
    pub aur: bool,
    /// Install the Flatpak dependency list.
    pub flatpak: bool,
}

impl InstallSelection {
    /// Every install action.
    pub const ALL: Self = Self {
        dotfiles: true,
        aur: true,
        flatpak: true,
    };
}

/// Which export actions were requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSelection {
    /// Export explicitly installed AUR helper packages.
    pub aur: bool,
    /// Export installed Flatpak applications.
    pub flatpak: bool,
}

/// Tasks for the selected install actions, in run order: AUR packages,
/// Flatpak packages, then dotfiles.
#[must_use]
pub fn install_tasks(selection: InstallSelection) -> Vec<Box<dyn Task>> {
    let mut tasks: Vec<Box<dyn Task>> = Vec::new();
    if selection.aur {
        tasks.push(Box::new(packages::InstallAurPackages));
    }
    if selection.flatpak {
        tasks.push(Box::new(packages::InstallFlatpakPackages));
    }
    if selection.dotfiles {
        tasks.push(Box::new(dotfiles::InstallDotfiles));
    }
    tasks
}

/// Tasks for the selected export actions, AUR first.
#[must_use]
pub fn export_tasks(selection: ExportSelection) -> Vec<Box<dyn Task>> {
    let mut tasks: Vec<Box<dyn Task>> = Vec::new();
    if selection.aur {
        tasks.push(Box::new(packages::ExportAurPackages));
    }
    if selection.flatpak {
        tasks.push(Box::new(packages::ExportFlatpakPackages));
    }
    tasks
}

/// The complete set of tasks run by the install command.
#[must_use]
pub fn all_install_tasks() -> Vec<Box<dyn Task>> {
    install_tasks(InstallSelection::ALL)
}

/// The complete set of tasks run by the export command.
#[must_use]
pub fn all_export_tasks() -> Vec<Box<dyn Task>> {
    export_tasks(ExportSelection {
        aur: true,
        flatpak: true,
    })
}

/// Execute a task, recording the result in the logger.
///
/// # Errors
///
/// Returns the task's error after recording it as failed.
pub fn execute(task: &dyn Task, ctx: &Context) -> Result<()> {
    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
            Ok(())
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
            Ok(())
        }
        Ok(TaskResult::Simulated) => {
            ctx.log.record_task(task.name(), TaskStatus::Simulated, None);
            Ok(())
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
            Err(e)
        }
    }
}
