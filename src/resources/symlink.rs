//! Symlink resource.
use std::fs;
use std::path::{Path, PathBuf};

use super::helpers::fs::{
    ensure_parent_dir, exists_or_dangling, is_absent, parent_missing, remove_existing,
};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::FsError;
use crate::logging::Log;

/// A symlink resource that can be checked and applied.
#[derive(Debug, Clone)]
pub struct SymlinkResource {
    /// The source file/directory (what the symlink points to).
    pub source: PathBuf,
    /// The target path (where the symlink will be created).
    pub target: PathBuf,
}

impl SymlinkResource {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Applicable for SymlinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    fn apply(&self, simulate: bool, log: &dyn Log) -> Result<ResourceChange, FsError> {
        match self.current_state()? {
            ResourceState::Invalid { .. } => {
                return Err(FsError::SourceMissing(self.source.clone()));
            }
            ResourceState::Correct => {
                log.info(&format!("already linked {} (skipping)", self.description()));
                return Ok(ResourceChange::AlreadyCorrect);
            }
            ResourceState::Incorrect { current } if simulate => {
                log.simulate(&format!("remove {} ({current})", self.target.display()));
            }
            ResourceState::Incorrect { current } => {
                remove_existing(&self.target)?;
                log.info(&format!("removed {} ({current})", self.target.display()));
            }
            ResourceState::Missing => {}
        }

        if simulate {
            if parent_missing(&self.target)
                && let Some(parent) = self.target.parent()
            {
                log.simulate(&format!("create directory {}", parent.display()));
            }
            log.simulate(&format!("link {}", self.description()));
            return Ok(ResourceChange::Simulated);
        }

        ensure_parent_dir(&self.target)?;
        std::os::unix::fs::symlink(&self.source, &self.target).map_err(|source| {
            FsError::Link {
                link: self.target.clone(),
                dest: self.source.clone(),
                source,
            }
        })?;
        log.info(&format!("linked {}", self.description()));
        Ok(ResourceChange::Applied)
    }
}

impl Resource for SymlinkResource {
    fn current_state(&self) -> Result<ResourceState, FsError> {
        if !exists_or_dangling(&self.source) {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }

        let meta = match self.target.symlink_metadata() {
            Ok(meta) => meta,
            Err(e) if is_absent(&e) => return Ok(ResourceState::Missing),
            Err(source) => {
                return Err(FsError::Stat {
                    path: self.target.clone(),
                    source,
                });
            }
        };

        if meta.is_symlink() {
            let dest = fs::read_link(&self.target).map_err(|source| FsError::Stat {
                path: self.target.clone(),
                source,
            })?;
            if dest == self.source {
                return Ok(ResourceState::Correct);
            }
            return Ok(ResourceState::Incorrect {
                current: dest.display().to_string(),
            });
        }

        let kind = if meta.is_dir() {
            "directory"
        } else {
            "regular file"
        };
        Ok(ResourceState::Incorrect {
            current: kind.to_string(),
        })
    }
}

/// Make `target` a symlink pointing at `source`, replacing whatever occupies
/// `target` unless it already points there.
///
/// # Errors
///
/// Returns [`FsError::SourceMissing`] if `source` does not exist, and
/// [`FsError::Remove`], [`FsError::CreateDir`], [`FsError::NotADirectory`] or
/// [`FsError::Link`] if a filesystem step fails.
pub fn ensure_link(
    source: &Path,
    target: &Path,
    simulate: bool,
    log: &dyn Log,
) -> Result<ResourceChange, FsError> {
    SymlinkResource::new(source.to_path_buf(), target.to_path_buf()).apply(simulate, log)
}
