//! File-system resource helpers.
use std::fs;
use std::io;
use std::os::unix::fs::DirBuilderExt as _;
use std::path::Path;

use crate::error::FsError;

/// Permission bits for directories created on behalf of a resource.
pub const DIR_MODE: u32 = 0o755;

/// Whether `path` exists, counting a dangling symlink as existing.
#[must_use]
pub fn exists_or_dangling(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Whether a stat error means the path simply is not there, including when a
/// parent component is a file.
#[must_use]
pub fn is_absent(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

/// Ensure `path` is a directory, creating it and any ancestors with mode
/// `0755` if absent.
///
/// # Errors
///
/// Returns [`FsError::NotADirectory`] if something other than a directory
/// occupies `path`, and [`FsError::CreateDir`] if creation fails.
pub fn ensure_dir(path: &Path) -> Result<(), FsError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(FsError::NotADirectory(path.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => fs::DirBuilder::new()
            .recursive(true)
            .mode(DIR_MODE)
            .create(path)
            .map_err(|source| FsError::CreateDir {
                path: path.to_path_buf(),
                source,
            }),
        Err(source) => Err(FsError::CreateDir {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Ensure the parent directory of `path` exists.
///
/// # Errors
///
/// Propagates errors from [`ensure_dir`].
pub fn ensure_parent_dir(path: &Path) -> Result<(), FsError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

/// Whether the parent directory of `path` would have to be created.
#[must_use]
pub fn parent_missing(path: &Path) -> bool {
    path.parent()
        .is_some_and(|p| !p.as_os_str().is_empty() && !p.is_dir())
}

/// Remove whatever occupies `path`: a file, a symlink (dangling or not, never
/// followed) or a whole directory tree.
///
/// Returns `true` if something was removed and `false` if `path` was absent.
///
/// # Errors
///
/// Returns [`FsError::Remove`] if the path exists but cannot be removed.
pub fn remove_existing(path: &Path) -> Result<bool, FsError> {
    let remove_err = |source| FsError::Remove {
        path: path.to_path_buf(),
        source,
    };
    let meta = match path.symlink_metadata() {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(remove_err(e)),
    };
    if meta.is_dir() {
        fs::remove_dir_all(path).map_err(remove_err)?;
    } else {
        fs::remove_file(path).map_err(remove_err)?;
    }
    Ok(true)
}
