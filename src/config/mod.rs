pub mod deps;

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::exec::{Executor, OutputMode};

/// Name of the optional settings file at the repository root.
pub const SETTINGS_FILE: &str = "dot-install.toml";

/// Environment variable overriding the repository root.
pub const ROOT_ENV: &str = "DOT_INSTALL_ROOT";

/// `.config` entries that are copied instead of symlinked.
///
/// Some applications replace their config file atomically, which would turn
/// a symlink back into a regular file on the first save.
pub static COPY_EXCEPTIONS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| HashSet::from(["mimeapps.list"]));

/// AUR helpers in detection priority order.
pub const AUR_HELPERS: &[&str] = &["paru", "yay"];

/// Keys accepted in `dot-install.toml`; every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SettingsFile {
    aur_deps_file: PathBuf,
    flatpak_deps_file: PathBuf,
    flatpak_remote: String,
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            aur_deps_file: PathBuf::from("aur-deps"),
            flatpak_deps_file: PathBuf::from("flatpak-deps"),
            flatpak_remote: "flathub".to_string(),
        }
    }
}

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Repository root.
    pub root: PathBuf,
    /// AUR dependency list, relative to `root` unless absolute.
    pub aur_deps_file: PathBuf,
    /// Flatpak dependency list, relative to `root` unless absolute.
    pub flatpak_deps_file: PathBuf,
    /// Flatpak remote packages are installed from.
    pub flatpak_remote: String,
}

impl Settings {
    /// Load settings for `root`, reading `<root>/dot-install.toml` if present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file exists but cannot be read, and
    /// [`ConfigError::Parse`] if it is not valid TOML or has unknown keys.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(SETTINGS_FILE);
        let file = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })?
        } else {
            SettingsFile::default()
        };

        Ok(Self {
            root: root.to_path_buf(),
            aur_deps_file: file.aur_deps_file,
            flatpak_deps_file: file.flatpak_deps_file,
            flatpak_remote: file.flatpak_remote,
        })
    }

    /// Settings with every default, rooted at `root`.
    #[must_use]
    pub fn with_defaults(root: &Path) -> Self {
        let file = SettingsFile::default();
        Self {
            root: root.to_path_buf(),
            aur_deps_file: file.aur_deps_file,
            flatpak_deps_file: file.flatpak_deps_file,
            flatpak_remote: file.flatpak_remote,
        }
    }

    /// Full path of the AUR dependency list.
    #[must_use]
    pub fn aur_deps_path(&self) -> PathBuf {
        self.root.join(&self.aur_deps_file)
    }

    /// Full path of the Flatpak dependency list.
    #[must_use]
    pub fn flatpak_deps_path(&self) -> PathBuf {
        self.root.join(&self.flatpak_deps_file)
    }
}

/// Directory under `root` whose children are installed into `~/.config`.
#[must_use]
pub fn config_source_dir(root: &Path) -> PathBuf {
    root.join(".config")
}

/// Determine the repository root.
///
/// Order: the `--root` flag, then `$DOT_INSTALL_ROOT`, then
/// `git rev-parse --show-toplevel` from the current directory. The result is
/// always absolute, since symlinks into the repository are stored with it.
///
/// # Errors
///
/// Returns [`ConfigError::RootResolution`] if none of the sources yields a
/// root.
pub fn resolve_root(flag: Option<&Path>, executor: &dyn Executor) -> Result<PathBuf, ConfigError> {
    resolve_root_with_env(flag, std::env::var_os(ROOT_ENV), executor)
}

fn resolve_root_with_env(
    flag: Option<&Path>,
    env_root: Option<OsString>,
    executor: &dyn Executor,
) -> Result<PathBuf, ConfigError> {
    if let Some(root) = flag {
        return absolute_root(root);
    }

    if let Some(root) = env_root.filter(|v| !v.is_empty()) {
        return absolute_root(Path::new(&root));
    }

    if !executor.which("git") {
        return Err(ConfigError::RootResolution(format!(
            "git not found in PATH; use --root or set {ROOT_ENV}"
        )));
    }

    let result = executor
        .run("git", &["rev-parse", "--show-toplevel"], OutputMode::Capture)
        .map_err(|e| ConfigError::RootResolution(e.to_string()))?;

    let top = result.stdout_lossy();
    let top = top.trim();
    if top.is_empty() {
        return Err(ConfigError::RootResolution(
            "git rev-parse returned an empty path".to_string(),
        ));
    }
    absolute_root(Path::new(top))
}

fn absolute_root(root: &Path) -> Result<PathBuf, ConfigError> {
    std::path::absolute(root)
        .map_err(|e| ConfigError::RootResolution(format!("{}: {e}", root.display())))
}
