//! Package manager commands: AUR helper detection and argument building.
use crate::config::AUR_HELPERS;
use crate::error::PackageError;
use crate::exec::Executor;

/// Flatpak binary name.
pub const FLATPAK: &str = "flatpak";

/// Flags passed to the AUR helper before the package names.
pub const AUR_INSTALL_FLAGS: &[&str] = &[
    "-S",
    "--needed",
    "--noconfirm",
    "--noprovides",
    "--useask",
    "--batchinstall",
    "--norebuild",
    "--sudoloop",
    "--skipreview",
];

/// Lists explicitly installed packages, one name per line.
pub const AUR_EXPORT_ARGS: &[&str] = &["-Qqe"];

/// Lists installed Flatpak applications, one application ID per line.
pub const FLATPAK_EXPORT_ARGS: &[&str] = &["list", "--app", "--columns=application"];

/// An AUR helper found on `PATH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AurHelper {
    name: &'static str,
}

impl AurHelper {
    /// Binary name of the helper.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Arguments for installing `deps`.
    ///
    /// In simulate mode `--print` is appended after the flags so the helper
    /// would only print its targets.
    #[must_use]
    pub fn install_args(deps: &[String], simulate: bool) -> Vec<&str> {
        let mut args = AUR_INSTALL_FLAGS.to_vec();
        if simulate {
            args.push("--print");
        }
        args.extend(deps.iter().map(String::as_str));
        args
    }
}

impl std::fmt::Display for AurHelper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Return the first known AUR helper available on `PATH`.
///
/// # Errors
///
/// Returns [`PackageError::NoHelperFound`] if none of the helpers is present.
pub fn find_aur_helper(executor: &dyn Executor) -> Result<AurHelper, PackageError> {
    AUR_HELPERS
        .iter()
        .copied()
        .find(|name| executor.which(name))
        .map(|name| AurHelper { name })
        .ok_or_else(|| PackageError::NoHelperFound {
            supported: AUR_HELPERS.join(", "),
        })
}

/// Fail unless `binary` is on `PATH`.
///
/// # Errors
///
/// Returns [`PackageError::BinaryNotFound`] if the binary is missing.
pub fn require_binary(executor: &dyn Executor, binary: &str) -> Result<(), PackageError> {
    if executor.which(binary) {
        Ok(())
    } else {
        Err(PackageError::BinaryNotFound(binary.to_string()))
    }
}

/// Arguments for installing one Flatpak application from `remote`.
#[must_use]
pub fn flatpak_install_args<'a>(remote: &'a str, app: &'a str) -> [&'a str; 4] {
    ["install", "-y", remote, app]
}
