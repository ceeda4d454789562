//! Domain-specific error types for dot-install.
//!
//! Library modules return these typed errors; task and command handlers at
//! the CLI boundary convert them to [`anyhow::Error`] via the standard `?`
//! operator and attach context there.
//!
//! # Error hierarchy
//!
//! ```text
//! FsError: link / copy reconciliation, directory preparation
//! DepsError: dependency list read / write
//! InstallError: dotfiles installer (wraps FsError per entry)
//! PackageError: AUR / Flatpak install and export (wraps DepsError, ExecError)
//! ExecError: subprocess spawn and exit status
//! ConfigError: repository root and settings file
//! ```

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the filesystem reconciler.
#[derive(Error, Debug)]
pub enum FsError {
    /// A source or target path was blank.
    #[error("empty path (source={src:?}, target={dst:?})")]
    EmptyPath {
        /// Source path as given.
        src: PathBuf,
        /// Target path as given.
        dst: PathBuf,
    },

    /// The link source does not exist and is not a dangling symlink either.
    #[error("source does not exist: {}", .0.display())]
    SourceMissing(PathBuf),

    /// The source of a copy could not be stat'ed.
    #[error("stat source {}", .path.display())]
    Stat {
        /// Path that could not be stat'ed.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The source of a copy is not a regular file.
    #[error("source is not a regular file: {}", .0.display())]
    NotRegularFile(PathBuf),

    /// Source and target resolve to the same absolute path.
    #[error("source and target are the same: {}", .0.display())]
    SelfCopy(PathBuf),

    /// A path that must be a directory is occupied by something else.
    #[error("path exists and is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// A directory (and its ancestors) could not be created.
    #[error("create directory {}", .path.display())]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// An existing target could not be removed.
    #[error("remove {}", .path.display())]
    Remove {
        /// Path that could not be removed.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The symlink could not be created.
    #[error("symlink {} -> {}", .link.display(), .dest.display())]
    Link {
        /// Where the symlink was to be created.
        link: PathBuf,
        /// What the symlink was to point at.
        dest: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The copy source could not be read.
    #[error("read source {}", .path.display())]
    Read {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The copy target could not be written.
    #[error("write target {}", .path.display())]
    Write {
        /// Path that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// Errors raised while reading or writing a dependency list.
#[derive(Error, Debug)]
pub enum DepsError {
    /// The file could not be opened.
    #[error("open {}", .path.display())]
    Open {
        /// Path that could not be opened.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The line reader failed (I/O error or invalid UTF-8).
    #[error("read {} at line {line}", .path.display())]
    Scan {
        /// File being scanned.
        path: PathBuf,
        /// One-based line number where reading failed.
        line: usize,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The output path was blank.
    #[error("file path is empty")]
    EmptyPath,

    /// The file could not be created or written.
    #[error("write {}", .path.display())]
    Write {
        /// Path that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// Errors raised by the dotfiles installer.
#[derive(Error, Debug)]
pub enum InstallError {
    /// The user's home directory could not be determined.
    #[error("failed to determine the user home directory (is HOME set?)")]
    HomeResolution,

    /// `~/.config` could not be prepared.
    #[error("failed to prepare config directory {}", .path.display())]
    TargetDir {
        /// The target config directory.
        path: PathBuf,
        /// What went wrong.
        source: FsError,
    },

    /// The repository has no `.config` directory.
    #[error("source .config directory does not exist in the repository: {}", .0.display())]
    SourceMissing(PathBuf),

    /// The source `.config` directory could not be listed.
    #[error("failed to read source directory {}", .path.display())]
    ReadDir {
        /// The source directory.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Reconciling one config entry failed; the installer stops here.
    #[error("failed to install config entry {name}")]
    Entry {
        /// File name of the entry under `.config`.
        name: String,
        /// What went wrong.
        source: FsError,
    },
}

/// Errors raised by the package installer and exporter.
#[derive(Error, Debug)]
pub enum PackageError {
    /// None of the known AUR helpers is on `PATH`.
    #[error("no AUR helper found; supported helpers are: {supported}")]
    NoHelperFound {
        /// Comma-separated list of supported helper names.
        supported: String,
    },

    /// A required binary is not on `PATH`.
    #[error("binary {0} not found in PATH")]
    BinaryNotFound(String),

    /// A dependency list could not be read or written.
    #[error("dependency file {}", .path.display())]
    Deps {
        /// The dependency list path.
        path: PathBuf,
        /// What went wrong.
        source: DepsError,
    },

    /// The package manager itself failed.
    #[error(transparent)]
    Command(#[from] ExecError),

    /// Installing a single dependency failed; the loop stops here.
    #[error("failed to install dependency {name}")]
    DependencyInstall {
        /// Package identifier that failed.
        name: String,
        /// Underlying command failure.
        source: ExecError,
    },

    /// The export command failed.
    #[error("failed to export dependencies using {program}")]
    Export {
        /// Program that produced the list.
        program: String,
        /// Underlying command failure.
        source: ExecError,
    },
}

/// Errors raised by the subprocess primitive.
#[derive(Error, Debug)]
pub enum ExecError {
    /// The process could not be started.
    #[error("failed to execute {program}")]
    Spawn {
        /// Program that could not be started.
        program: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The process exited non-zero (`-1` when terminated by a signal).
    #[error("command '{program}' failed (exit {code})")]
    Failed {
        /// Program that failed.
        program: String,
        /// Exit code, or `-1` when unavailable.
        code: i32,
    },
}

/// Errors raised while resolving the repository root or loading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The repository root could not be determined.
    #[error("cannot determine repository root: {0}")]
    RootResolution(String),

    /// The settings file exists but could not be read.
    #[error("IO error reading config file {}", .path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The settings file is not valid TOML for the expected schema.
    #[error("invalid config file {}", .path.display())]
    Parse {
        /// Path to the offending file.
        path: PathBuf,
        /// Parser error.
        source: toml::de::Error,
    },
}
