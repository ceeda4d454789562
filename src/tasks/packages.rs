//! Tasks: install and export AUR and Flatpak dependency lists.
use std::path::Path;

use anyhow::{Context as _, Result};

use super::{Context, Task, TaskResult};
use crate::config::deps::{parse_deps, parse_deps_file, write_deps_file};
use crate::error::PackageError;
use crate::exec::{Executor, OutputMode};
use crate::logging::Log;
use crate::resources::package::{
    AUR_EXPORT_ARGS, AurHelper, FLATPAK, FLATPAK_EXPORT_ARGS, find_aur_helper,
    flatpak_install_args, require_binary,
};

fn read_deps(path: &Path) -> Result<Vec<String>, PackageError> {
    parse_deps_file(path).map_err(|source| PackageError::Deps {
        path: path.to_path_buf(),
        source,
    })
}

/// `[first..last]` for a non-empty list, used in install summaries.
fn span(deps: &[String]) -> String {
    match (deps.first(), deps.last()) {
        (Some(first), Some(last)) => format!("[{first}..{last}]"),
        _ => "[]".to_string(),
    }
}

/// Install the AUR dependency list at `deps_path` with the first available
/// AUR helper.
///
/// # Errors
///
/// Returns [`PackageError::NoHelperFound`] without a helper,
/// [`PackageError::Deps`] if the list cannot be read, and
/// [`PackageError::Command`] if the helper fails.
pub fn install_aur_deps(
    executor: &dyn Executor,
    log: &dyn Log,
    deps_path: &Path,
    simulate: bool,
) -> Result<TaskResult, PackageError> {
    let helper = find_aur_helper(executor)?;
    log.debug(&format!("using AUR helper {helper}"));

    let deps = read_deps(deps_path)?;
    if deps.is_empty() {
        log.info("no AUR dependencies to install");
        return Ok(TaskResult::Skipped(format!(
            "no AUR dependencies in {}",
            deps_path.display()
        )));
    }

    let args = AurHelper::install_args(&deps, simulate);
    let summary = format!(
        "{} AUR dependencies using {helper} {}",
        deps.len(),
        span(&deps)
    );

    if simulate {
        log.simulate(&format!("install {summary}"));
        log.debug(&format!("{helper} {}", args.join(" ")));
        return Ok(TaskResult::Simulated);
    }

    log.info(&format!("installing {summary}"));
    executor.run(helper.name(), &args, OutputMode::Inherit)?;
    Ok(TaskResult::Ok)
}

/// Install the Flatpak dependency list at `deps_path` from `remote`, one
/// application at a time.
///
/// # Errors
///
/// Returns [`PackageError::BinaryNotFound`] without `flatpak`,
/// [`PackageError::Deps`] if the list cannot be read, and
/// [`PackageError::DependencyInstall`] for the first application that fails.
pub fn install_flatpak_deps(
    executor: &dyn Executor,
    log: &dyn Log,
    deps_path: &Path,
    remote: &str,
    simulate: bool,
) -> Result<TaskResult, PackageError> {
    require_binary(executor, FLATPAK)?;

    let deps = read_deps(deps_path)?;
    if deps.is_empty() {
        log.info("no Flatpak dependencies to install");
        return Ok(TaskResult::Skipped(format!(
            "no Flatpak dependencies in {}",
            deps_path.display()
        )));
    }

    if simulate {
        log.simulate(&format!(
            "install {} Flatpak dependencies from {remote} {}",
            deps.len(),
            span(&deps)
        ));
        for dep in &deps {
            log.debug(&format!(
                "{FLATPAK} {}",
                flatpak_install_args(remote, dep).join(" ")
            ));
        }
        return Ok(TaskResult::Simulated);
    }

    log.info(&format!(
        "installing {} Flatpak dependencies from {remote}",
        deps.len()
    ));
    for dep in &deps {
        log.info(&format!("installing {dep}"));
        executor
            .run(
                FLATPAK,
                &flatpak_install_args(remote, dep),
                OutputMode::Inherit,
            )
            .map_err(|source| PackageError::DependencyInstall {
                name: dep.clone(),
                source,
            })?;
    }
    Ok(TaskResult::Ok)
}

/// Run `binary args...` and write its stdout verbatim to `output_path`.
///
/// Returns the number of non-blank lines written.
///
/// # Errors
///
/// Returns [`PackageError::BinaryNotFound`] if `binary` is missing,
/// [`PackageError::Export`] if it fails, and [`PackageError::Deps`] if the
/// output file cannot be written.
pub fn export_generic_deps(
    executor: &dyn Executor,
    log: &dyn Log,
    binary: &str,
    args: &[&str],
    output_path: &Path,
) -> Result<usize, PackageError> {
    require_binary(executor, binary)?;
    log.debug(&format!("{binary} {}", args.join(" ")));

    let result = executor
        .run(binary, args, OutputMode::Capture)
        .map_err(|source| PackageError::Export {
            program: binary.to_string(),
            source,
        })?;

    write_deps_file(output_path, &result.stdout).map_err(|source| PackageError::Deps {
        path: output_path.to_path_buf(),
        source,
    })?;

    let count = parse_deps(result.stdout.as_slice(), output_path)
        .map_err(|source| PackageError::Deps {
            path: output_path.to_path_buf(),
            source,
        })?
        .len();
    log.info(&format!(
        "exported {count} dependencies to {}",
        output_path.display()
    ));
    Ok(count)
}

/// Install packages from the AUR dependency list.
#[derive(Debug)]
pub struct InstallAurPackages;

impl Task for InstallAurPackages {
    fn name(&self) -> &'static str {
        "Install AUR packages"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let path = ctx.settings.aur_deps_path();
        install_aur_deps(
            ctx.executor.as_ref(),
            ctx.log.as_ref(),
            &path,
            ctx.simulate,
        )
        .with_context(|| format!("installing AUR dependencies from {}", path.display()))
    }
}

/// Install applications from the Flatpak dependency list.
#[derive(Debug)]
pub struct InstallFlatpakPackages;

impl Task for InstallFlatpakPackages {
    fn name(&self) -> &'static str {
        "Install Flatpak packages"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let path = ctx.settings.flatpak_deps_path();
        install_flatpak_deps(
            ctx.executor.as_ref(),
            ctx.log.as_ref(),
            &path,
            &ctx.settings.flatpak_remote,
            ctx.simulate,
        )
        .with_context(|| format!("installing Flatpak dependencies from {}", path.display()))
    }
}

/// Write explicitly installed packages to the AUR dependency list.
#[derive(Debug)]
pub struct ExportAurPackages;

impl Task for ExportAurPackages {
    fn name(&self) -> &'static str {
        "Export AUR packages"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let path = ctx.settings.aur_deps_path();
        let helper = find_aur_helper(ctx.executor.as_ref())?;
        export_generic_deps(
            ctx.executor.as_ref(),
            ctx.log.as_ref(),
            helper.name(),
            AUR_EXPORT_ARGS,
            &path,
        )
        .with_context(|| format!("exporting AUR dependencies to {}", path.display()))?;
        Ok(TaskResult::Ok)
    }
}

/// Write installed Flatpak applications to the Flatpak dependency list.
#[derive(Debug)]
pub struct ExportFlatpakPackages;

impl Task for ExportFlatpakPackages {
    fn name(&self) -> &'static str {
        "Export Flatpak packages"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let path = ctx.settings.flatpak_deps_path();
        export_generic_deps(
            ctx.executor.as_ref(),
            ctx.log.as_ref(),
            FLATPAK,
            FLATPAK_EXPORT_ARGS,
            &path,
        )
        .with_context(|| format!("exporting Flatpak dependencies to {}", path.display()))?;
        Ok(TaskResult::Ok)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::{DepsError, ExecError};
    use crate::exec::test_helpers::RecordingExecutor;
    use crate::logging::test_helpers::RecordingLog;
    use crate::resources::package::AUR_INSTALL_FLAGS;
    use crate::tasks::test_helpers::make_context;
    use std::fs;

    fn deps_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    // -----------------------------------------------------------------------
    // install_aur_deps
    // -----------------------------------------------------------------------

    #[test]
    fn aur_installs_all_deps_in_one_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = deps_file(dir.path(), "aur-deps", "# editors\nneovim-git\n\nparu-bin\n");
        let executor = RecordingExecutor::new().with_binaries(&["paru"]);
        let log = RecordingLog::new();

        let result = install_aur_deps(&executor, &log, &path, false).unwrap();

        assert_eq!(result, TaskResult::Ok);
        let calls = executor.calls();
        assert_eq!(calls.len(), 1);
        let (program, args, mode) = &calls[0];
        assert_eq!(program, "paru");
        assert_eq!(*mode, OutputMode::Inherit);
        assert_eq!(&args[..AUR_INSTALL_FLAGS.len()], AUR_INSTALL_FLAGS);
        assert_eq!(&args[AUR_INSTALL_FLAGS.len()..], ["neovim-git", "paru-bin"]);
        assert!(log.contains("info: installing 2 AUR dependencies using paru [neovim-git..paru-bin]"));
    }

    #[test]
    fn aur_simulate_does_not_run_helper() {
        let dir = tempfile::tempdir().unwrap();
        let path = deps_file(dir.path(), "aur-deps", "a\nb\nc\n");
        let executor = RecordingExecutor::new().with_binaries(&["yay"]);
        let log = RecordingLog::new();

        let result = install_aur_deps(&executor, &log, &path, true).unwrap();

        assert_eq!(result, TaskResult::Simulated);
        assert!(executor.calls().is_empty());
        assert!(log.contains("simulate: install 3 AUR dependencies using yay [a..c]"));
        assert!(log.contains("--print a b c"));
    }

    #[test]
    fn aur_empty_list_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = deps_file(dir.path(), "aur-deps", "# nothing yet\n\n");
        let executor = RecordingExecutor::new().with_binaries(&["paru"]);

        let result = install_aur_deps(&executor, &RecordingLog::new(), &path, false).unwrap();

        assert!(matches!(result, TaskResult::Skipped(_)));
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn aur_without_helper_fails_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let err = install_aur_deps(
            &RecordingExecutor::new(),
            &RecordingLog::new(),
            &dir.path().join("missing"),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, PackageError::NoHelperFound { .. }));
    }

    #[test]
    fn aur_missing_list_wraps_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aur-deps");
        let executor = RecordingExecutor::new().with_binaries(&["paru"]);
        let err = install_aur_deps(&executor, &RecordingLog::new(), &path, false).unwrap_err();
        assert!(
            matches!(&err, PackageError::Deps { path: p, source: DepsError::Open { .. } } if *p == path),
            "got {err:?}"
        );
    }

    #[test]
    fn aur_helper_failure_is_command_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = deps_file(dir.path(), "aur-deps", "paru-bin\n");
        let executor = RecordingExecutor::new()
            .with_binaries(&["paru"])
            .with_response(false, "");
        let err = install_aur_deps(&executor, &RecordingLog::new(), &path, false).unwrap_err();
        assert!(matches!(
            err,
            PackageError::Command(ExecError::Failed { code: 1, .. })
        ));
    }

    // -----------------------------------------------------------------------
    // install_flatpak_deps
    // -----------------------------------------------------------------------

    #[test]
    fn flatpak_installs_one_at_a_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = deps_file(
            dir.path(),
            "flatpak-deps",
            "org.mozilla.firefox\n// chat\ncom.discordapp.Discord\n",
        );
        let executor = RecordingExecutor::new().with_binaries(&["flatpak"]);

        let result =
            install_flatpak_deps(&executor, &RecordingLog::new(), &path, "flathub", false)
                .unwrap();

        assert_eq!(result, TaskResult::Ok);
        let calls = executor.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "flatpak");
        assert_eq!(calls[0].1, ["install", "-y", "flathub", "org.mozilla.firefox"]);
        assert_eq!(calls[1].1, ["install", "-y", "flathub", "com.discordapp.Discord"]);
        assert!(calls.iter().all(|c| c.2 == OutputMode::Inherit));
    }

    #[test]
    fn flatpak_stops_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = deps_file(dir.path(), "flatpak-deps", "a.One\nb.Two\nc.Three\n");
        let executor = RecordingExecutor::new()
            .with_binaries(&["flatpak"])
            .with_response(true, "")
            .with_response(false, "");

        let err = install_flatpak_deps(&executor, &RecordingLog::new(), &path, "flathub", false)
            .unwrap_err();

        assert!(
            matches!(&err, PackageError::DependencyInstall { name, .. } if name == "b.Two"),
            "got {err:?}"
        );
        assert_eq!(executor.calls().len(), 2, "c.Three must not be attempted");
    }

    #[test]
    fn flatpak_uses_configured_remote() {
        let dir = tempfile::tempdir().unwrap();
        let path = deps_file(dir.path(), "flatpak-deps", "org.gnome.Builder\n");
        let executor = RecordingExecutor::new().with_binaries(&["flatpak"]);
        install_flatpak_deps(&executor, &RecordingLog::new(), &path, "gnome-nightly", false)
            .unwrap();
        assert_eq!(executor.calls()[0].1[2], "gnome-nightly");
    }

    #[test]
    fn flatpak_simulate_and_empty_do_not_run() {
        let dir = tempfile::tempdir().unwrap();
        let full = deps_file(dir.path(), "full", "a.One\nb.Two\n");
        let empty = deps_file(dir.path(), "empty", "\n");
        let executor = RecordingExecutor::new().with_binaries(&["flatpak"]);
        let log = RecordingLog::new();

        assert_eq!(
            install_flatpak_deps(&executor, &log, &full, "flathub", true).unwrap(),
            TaskResult::Simulated
        );
        assert!(matches!(
            install_flatpak_deps(&executor, &log, &empty, "flathub", false).unwrap(),
            TaskResult::Skipped(_)
        ));
        assert!(executor.calls().is_empty());
        assert!(log.contains("simulate: install 2 Flatpak dependencies from flathub [a.One..b.Two]"));
    }

    #[test]
    fn flatpak_missing_binary() {
        let err = install_flatpak_deps(
            &RecordingExecutor::new(),
            &RecordingLog::new(),
            Path::new("flatpak-deps"),
            "flathub",
            false,
        )
        .unwrap_err();
        assert!(matches!(err, PackageError::BinaryNotFound(ref b) if b == "flatpak"));
    }

    // -----------------------------------------------------------------------
    // export_generic_deps
    // -----------------------------------------------------------------------

    #[test]
    fn export_writes_stdout_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let out = deps_file(dir.path(), "flatpak-deps", "stale\nentries\nhere\n");
        let stdout = "org.mozilla.firefox\norg.gnome.Builder\n";
        let executor = RecordingExecutor::new()
            .with_binaries(&["flatpak"])
            .with_response(true, stdout);

        let count = export_generic_deps(
            &executor,
            &RecordingLog::new(),
            FLATPAK,
            FLATPAK_EXPORT_ARGS,
            &out,
        )
        .unwrap();

        assert_eq!(count, 2);
        assert_eq!(fs::read_to_string(&out).unwrap(), stdout);
        let calls = executor.calls();
        assert_eq!(calls[0].1, ["list", "--app", "--columns=application"]);
        assert_eq!(calls[0].2, OutputMode::Capture);
    }

    #[test]
    fn export_count_matches_what_install_reads() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("aur-deps");
        let stdout = "base-devel\n\n  \nneovim\r\n# not a package\n";
        let executor = RecordingExecutor::new()
            .with_binaries(&["yay"])
            .with_response(true, stdout);
        let log = RecordingLog::new();

        let count = export_generic_deps(&executor, &log, "yay", AUR_EXPORT_ARGS, &out).unwrap();

        assert_eq!(count, 2);
        assert_eq!(fs::read_to_string(&out).unwrap(), stdout);
        assert_eq!(parse_deps_file(&out).unwrap().len(), count);
        assert!(log.contains("info: exported 2 dependencies"));
    }

    #[test]
    fn export_failure_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let out = deps_file(dir.path(), "aur-deps", "keep\n");
        let executor = RecordingExecutor::new()
            .with_binaries(&["paru"])
            .with_response(false, "partial\n");

        let err = export_generic_deps(&executor, &RecordingLog::new(), "paru", &["-Qqe"], &out)
            .unwrap_err();

        assert!(matches!(err, PackageError::Export { ref program, .. } if program == "paru"));
        assert_eq!(fs::read_to_string(&out).unwrap(), "keep\n");
    }

    #[test]
    fn export_missing_binary() {
        let dir = tempfile::tempdir().unwrap();
        let err = export_generic_deps(
            &RecordingExecutor::new(),
            &RecordingLog::new(),
            "flatpak",
            FLATPAK_EXPORT_ARGS,
            &dir.path().join("out"),
        )
        .unwrap_err();
        assert!(matches!(err, PackageError::BinaryNotFound(_)));
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    #[test]
    fn export_aur_task_uses_detected_helper() {
        let dir = tempfile::tempdir().unwrap();
        let executor = RecordingExecutor::new()
            .with_binaries(&["yay"])
            .with_response(true, "base-devel\nyay\n");
        let (ctx, _, executor) = make_context(dir.path(), None, false, executor);

        let result = ExportAurPackages.run(&ctx).unwrap();

        assert_eq!(result, TaskResult::Ok);
        let calls = executor.calls();
        assert_eq!(calls[0].0, "yay");
        assert_eq!(calls[0].1, ["-Qqe"]);
        assert_eq!(
            fs::read_to_string(dir.path().join("aur-deps")).unwrap(),
            "base-devel\nyay\n"
        );
    }

    #[test]
    fn export_flatpak_task_writes_default_path() {
        let dir = tempfile::tempdir().unwrap();
        let executor = RecordingExecutor::new()
            .with_binaries(&["flatpak"])
            .with_response(true, "org.mozilla.firefox\n");
        let (ctx, _, _) = make_context(dir.path(), None, false, executor);

        ExportFlatpakPackages.run(&ctx).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("flatpak-deps")).unwrap(),
            "org.mozilla.firefox\n"
        );
    }

    #[test]
    fn install_aur_task_reads_settings_path() {
        let dir = tempfile::tempdir().unwrap();
        deps_file(dir.path(), "aur-deps", "paru-bin\n");
        let executor = RecordingExecutor::new().with_binaries(&["paru"]);
        let (ctx, _, executor) = make_context(dir.path(), None, true, executor);

        let result = InstallAurPackages.run(&ctx).unwrap();

        assert_eq!(result, TaskResult::Simulated);
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn install_flatpak_task_error_has_context() {
        let dir = tempfile::tempdir().unwrap();
        let executor = RecordingExecutor::new().with_binaries(&["flatpak"]);
        let (ctx, _, _) = make_context(dir.path(), None, false, executor);

        let err = InstallFlatpakPackages.run(&ctx).unwrap_err();

        assert!(err.to_string().starts_with("installing Flatpak dependencies from"));
        assert!(err.downcast_ref::<PackageError>().is_some());
    }
}
