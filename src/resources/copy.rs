//! Copied-file resource, for config files that must not be symlinks.
use std::fs;
use std::os::unix::fs::PermissionsExt as _;
use std::path::{Path, PathBuf};

use super::helpers::fs::{ensure_parent_dir, is_absent, parent_missing, remove_existing};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::FsError;
use crate::logging::Log;

/// Permission bits carried over from source to target.
const MODE_MASK: u32 = 0o7777;

/// A regular file copied from `source` to `target` with its permission bits.
#[derive(Debug, Clone)]
pub struct CopyResource {
    /// The file to copy.
    pub source: PathBuf,
    /// Where the copy is written.
    pub target: PathBuf,
}

impl CopyResource {
    /// Create a new copy resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }

    /// Validate the pair and return the source's permission bits.
    fn check_source(&self) -> Result<u32, FsError> {
        if self.source.as_os_str().is_empty() || self.target.as_os_str().is_empty() {
            return Err(FsError::EmptyPath {
                src: self.source.clone(),
                dst: self.target.clone(),
            });
        }

        let abs_source = absolute(&self.source)?;
        if abs_source == absolute(&self.target)? {
            return Err(FsError::SelfCopy(abs_source));
        }

        let meta = fs::metadata(&self.source).map_err(|source| FsError::Stat {
            path: self.source.clone(),
            source,
        })?;
        if !meta.is_file() {
            return Err(FsError::NotRegularFile(self.source.clone()));
        }
        Ok(meta.permissions().mode() & MODE_MASK)
    }
}

fn absolute(path: &Path) -> Result<PathBuf, FsError> {
    std::path::absolute(path).map_err(|source| FsError::Stat {
        path: path.to_path_buf(),
        source,
    })
}

impl Applicable for CopyResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.source.display(), self.target.display())
    }

    fn apply(&self, simulate: bool, log: &dyn Log) -> Result<ResourceChange, FsError> {
        let mode = self.check_source()?;

        // The source was validated above, so only `Correct` needs no change.
        if !self.needs_change()? {
            log.info(&format!("already copied {} (skipping)", self.description()));
            return Ok(ResourceChange::AlreadyCorrect);
        }

        if simulate {
            if parent_missing(&self.target)
                && let Some(parent) = self.target.parent()
            {
                log.simulate(&format!("create directory {}", parent.display()));
            }
            log.simulate(&format!("copy {} (mode {mode:o})", self.description()));
            return Ok(ResourceChange::Simulated);
        }

        ensure_parent_dir(&self.target)?;

        // A symlink here would make the write land on whatever it points at.
        if self
            .target
            .symlink_metadata()
            .is_ok_and(|m| m.file_type().is_symlink())
        {
            remove_existing(&self.target)?;
        }

        let data = fs::read(&self.source).map_err(|source| FsError::Read {
            path: self.source.clone(),
            source,
        })?;
        let write_err = |source| FsError::Write {
            path: self.target.clone(),
            source,
        };
        fs::write(&self.target, &data).map_err(write_err)?;
        fs::set_permissions(&self.target, fs::Permissions::from_mode(mode)).map_err(write_err)?;

        log.info(&format!("copied {} (mode {mode:o})", self.description()));
        Ok(ResourceChange::Applied)
    }
}

impl Resource for CopyResource {
    fn current_state(&self) -> Result<ResourceState, FsError> {
        let Ok(source_meta) = fs::metadata(&self.source) else {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        };
        if !source_meta.is_file() {
            return Ok(ResourceState::Invalid {
                reason: format!("source is not a regular file: {}", self.source.display()),
            });
        }

        let stat_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| FsError::Stat { path, source }
        };

        let target_meta = match self.target.symlink_metadata() {
            Ok(meta) => meta,
            Err(e) if is_absent(&e) => return Ok(ResourceState::Missing),
            Err(e) => return Err(stat_err(&self.target)(e)),
        };
        if target_meta.file_type().is_symlink() {
            return Ok(ResourceState::Incorrect {
                current: "symlink".to_string(),
            });
        }
        if !target_meta.is_file() {
            return Ok(ResourceState::Incorrect {
                current: "directory".to_string(),
            });
        }

        let source_mode = source_meta.permissions().mode() & MODE_MASK;
        let target_mode = target_meta.permissions().mode() & MODE_MASK;
        if source_mode != target_mode {
            return Ok(ResourceState::Incorrect {
                current: format!("mode {target_mode:o}"),
            });
        }

        let wanted = fs::read(&self.source).map_err(stat_err(&self.source))?;
        let actual = fs::read(&self.target).map_err(stat_err(&self.target))?;
        if wanted == actual {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: "content differs".to_string(),
            })
        }
    }
}

/// Copy the regular file `source` to `target`, carrying over its permission
/// bits and creating the target's parent directories.
///
/// # Errors
///
/// Returns [`FsError::EmptyPath`], [`FsError::SelfCopy`], [`FsError::Stat`] or
/// [`FsError::NotRegularFile`] when the pair is unusable, and
/// [`FsError::CreateDir`], [`FsError::Read`] or [`FsError::Write`] when a
/// filesystem step fails.
pub fn copy_file(
    source: &Path,
    target: &Path,
    simulate: bool,
    log: &dyn Log,
) -> Result<ResourceChange, FsError> {
    CopyResource::new(source.to_path_buf(), target.to_path_buf()).apply(simulate, log)
}
