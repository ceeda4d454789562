//! Dependency list files: one package name per line.
//!
//! Blank lines and lines starting with `#` or `//` are ignored on read.
//! Exports are written back verbatim, replacing the previous contents.
use std::fs;
use std::io::{BufRead, BufReader, Write as _};
use std::os::unix::fs::OpenOptionsExt as _;
use std::path::Path;

use crate::error::DepsError;

/// Permission bits for newly created dependency files.
const DEPS_FILE_MODE: u32 = 0o644;

/// Read the dependency list at `path`.
///
/// # Errors
///
/// Returns [`DepsError::Open`] if the file cannot be opened and
/// [`DepsError::Scan`] if a line cannot be read.
pub fn parse_deps_file(path: &Path) -> Result<Vec<String>, DepsError> {
    let file = fs::File::open(path).map_err(|source| DepsError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_deps(BufReader::new(file), path)
}

/// Parse a dependency list from any buffered reader.
///
/// `origin` only labels errors.
///
/// # Errors
///
/// Returns [`DepsError::Scan`] if the reader fails or yields invalid UTF-8.
pub fn parse_deps<R: BufRead>(reader: R, origin: &Path) -> Result<Vec<String>, DepsError> {
    let mut deps = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| DepsError::Scan {
            path: origin.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }
        deps.push(line.to_string());
    }
    Ok(deps)
}

/// Replace the contents of `path` with `data`.
///
/// New files are created with mode `0644`; existing files keep their mode.
///
/// # Errors
///
/// Returns [`DepsError::EmptyPath`] for a blank path and [`DepsError::Write`]
/// if the file cannot be created or written.
pub fn write_deps_file(path: &Path, data: &[u8]) -> Result<(), DepsError> {
    if path.as_os_str().is_empty() {
        return Err(DepsError::EmptyPath);
    }
    let write_err = |source| DepsError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(DEPS_FILE_MODE)
        .open(path)
        .map_err(write_err)?;
    file.write_all(data).map_err(write_err)?;
    file.flush().map_err(write_err)
}
