//! Task: reconcile `~/.config` against the repository's `.config` directory.
use std::fs;
use std::path::Path;

use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::config::{COPY_EXCEPTIONS, config_source_dir};
use crate::error::{FsError, InstallError};
use crate::logging::Log;
use crate::resources::ResourceChange;
use crate::resources::copy::copy_file;
use crate::resources::helpers::fs::ensure_dir;
use crate::resources::symlink::ensure_link;

/// Counts of per-entry outcomes from one dotfiles run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DotfilesSummary {
    /// Entries linked or copied.
    pub changed: usize,
    /// Entries that already matched.
    pub unchanged: usize,
    /// Entries that would have changed in simulate mode.
    pub simulated: usize,
}

impl DotfilesSummary {
    fn record(&mut self, change: ResourceChange) {
        match change {
            ResourceChange::Applied => self.changed += 1,
            ResourceChange::AlreadyCorrect => self.unchanged += 1,
            ResourceChange::Simulated => self.simulated += 1,
        }
    }
}

/// Install every direct child of `<repo_root>/.config` into `<home>/.config`.
///
/// Children named in [`COPY_EXCEPTIONS`] are copied; everything else is
/// symlinked, directories included as a whole. Entries are processed in
/// name order and the first failure aborts the run.
///
/// # Errors
///
/// Returns [`InstallError::HomeResolution`] without a home directory,
/// [`InstallError::TargetDir`] if `~/.config` cannot be prepared,
/// [`InstallError::SourceMissing`] if the repository has no `.config`
/// directory, [`InstallError::ReadDir`] if it cannot be listed, and
/// [`InstallError::Entry`] for the first entry that fails.
pub fn install_dotfiles(
    repo_root: &Path,
    home: Option<&Path>,
    simulate: bool,
    log: &dyn Log,
) -> Result<DotfilesSummary, InstallError> {
    let home = home
        .filter(|h| !h.as_os_str().is_empty())
        .ok_or(InstallError::HomeResolution)?;
    let target_dir = home.join(".config");
    prepare_target_dir(&target_dir, simulate, log)?;

    // Links store this path, so a relative one would dangle from `~/.config`.
    let source_dir = config_source_dir(repo_root);
    let source_dir = std::path::absolute(&source_dir).map_err(|source| InstallError::ReadDir {
        path: source_dir.clone(),
        source,
    })?;
    if !source_dir.is_dir() {
        return Err(InstallError::SourceMissing(source_dir));
    }

    let read_dir_err = |source| InstallError::ReadDir {
        path: source_dir.clone(),
        source,
    };
    let mut entries = fs::read_dir(&source_dir)
        .map_err(read_dir_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_dir_err)?;
    entries.sort_by_key(fs::DirEntry::file_name);

    let mut summary = DotfilesSummary::default();
    for entry in entries {
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();
        let source = entry.path();
        let target = target_dir.join(&file_name);

        let change = if COPY_EXCEPTIONS.contains(name.as_ref()) {
            log.debug(&format!("copying exception {name}"));
            copy_file(&source, &target, simulate, log)
        } else {
            ensure_link(&source, &target, simulate, log)
        }
        .map_err(|source| InstallError::Entry {
            name: name.to_string(),
            source,
        })?;
        summary.record(change);
    }

    if simulate {
        log.info(&format!(
            "{} would change, {} already ok",
            summary.simulated, summary.unchanged
        ));
    } else {
        log.info(&format!(
            "{} changed, {} already ok",
            summary.changed, summary.unchanged
        ));
    }
    Ok(summary)
}

fn prepare_target_dir(
    target_dir: &Path,
    simulate: bool,
    log: &dyn Log,
) -> Result<(), InstallError> {
    let target_err = |source| InstallError::TargetDir {
        path: target_dir.to_path_buf(),
        source,
    };
    if !simulate {
        return ensure_dir(target_dir).map_err(target_err);
    }
    match fs::metadata(target_dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(target_err(FsError::NotADirectory(target_dir.to_path_buf()))),
        Err(_) => {
            log.simulate(&format!("create directory {}", target_dir.display()));
            Ok(())
        }
    }
}

/// Link (or copy) every entry of the repository's `.config` into `~/.config`.
#[derive(Debug)]
pub struct InstallDotfiles;

impl Task for InstallDotfiles {
    fn name(&self) -> &'static str {
        "Install dotfiles"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        install_dotfiles(
            &ctx.settings.root,
            ctx.home.as_deref(),
            ctx.simulate,
            ctx.log.as_ref(),
        )?;
        if ctx.simulate {
            Ok(TaskResult::Simulated)
        } else {
            Ok(TaskResult::Ok)
        }
    }
}
