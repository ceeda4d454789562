// Shared helpers for integration tests.
//
// Provides a temporary repository + home directory pair, a fluent builder to
// populate them, and a scripted executor so package tasks never reach a real
// package manager.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dot_install::config::Settings;
use dot_install::error::ExecError;
use dot_install::exec::{ExecResult, Executor, OutputMode};
use dot_install::logging::{Log, Logger};
use dot_install::tasks::Context;

/// One recorded executor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub program: String,
    pub args: Vec<String>,
    pub mode: OutputMode,
}

/// Executor that records calls and answers from a FIFO of
/// `(success, stdout)` pairs; an empty queue answers success.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    binaries: Vec<String>,
    responses: Mutex<VecDeque<(bool, String)>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedExecutor {
    pub fn with_binaries(binaries: &[&str]) -> Self {
        Self {
            binaries: binaries.iter().map(|b| (*b).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn respond(self, success: bool, stdout: &str) -> Self {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back((success, stdout.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl Executor for ScriptedExecutor {
    fn execute(
        &self,
        program: &str,
        args: &[&str],
        mode: OutputMode,
    ) -> Result<ExecResult, ExecError> {
        self.calls.lock().expect("calls lock").push(Call {
            program: program.to_string(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
            mode,
        });
        let (success, stdout) = self
            .responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or((true, String::new()));
        Ok(ExecResult {
            stdout: stdout.into_bytes(),
            success,
            code: Some(i32::from(!success)),
        })
    }

    fn which(&self, program: &str) -> bool {
        self.binaries.iter().any(|b| b == program)
    }
}

/// A dotfiles repository and a home directory inside one temporary directory.
pub struct TestRepo {
    dir: tempfile::TempDir,
}

impl TestRepo {
    /// Repository root.
    pub fn root(&self) -> PathBuf {
        self.dir.path().join("repo")
    }

    /// Home directory.
    pub fn home(&self) -> PathBuf {
        self.dir.path().join("home")
    }

    /// Everything below the temporary directory, with file kinds, sorted.
    pub fn snapshot(&self) -> Vec<String> {
        let mut out = Vec::new();
        walk(self.dir.path(), self.dir.path(), &mut out);
        out.sort();
        out
    }

    /// Build a task context with a fresh logger.
    pub fn context(
        &self,
        simulate: bool,
        executor: &Arc<ScriptedExecutor>,
    ) -> (Context, Arc<Logger>) {
        let log = Arc::new(Logger::with_log_file(None));
        let settings = Settings::load(&self.root()).expect("load settings");
        let ctx = Context {
            settings,
            home: Some(self.home()),
            log: Arc::clone(&log) as Arc<dyn Log>,
            simulate,
            executor: Arc::clone(executor) as Arc<dyn Executor>,
        };
        (ctx, log)
    }
}

fn walk(dir: &Path, root: &Path, out: &mut Vec<String>) {
    for entry in std::fs::read_dir(dir).expect("read_dir") {
        let path = entry.expect("entry").path();
        let rel = path
            .strip_prefix(root)
            .expect("strip prefix")
            .display()
            .to_string();
        let meta = std::fs::symlink_metadata(&path).expect("lstat");
        if meta.is_symlink() {
            let dest = std::fs::read_link(&path).expect("read_link");
            out.push(format!("{rel} -> {}", dest.display()));
        } else if meta.is_dir() {
            out.push(format!("{rel}/"));
            walk(&path, root, out);
        } else {
            let content = std::fs::read_to_string(&path).unwrap_or_default();
            out.push(format!("{rel}: {content:?}"));
        }
    }
}

/// Fluent builder for [`TestRepo`].
pub struct TestRepoBuilder {
    repo: TestRepo,
}

impl TestRepoBuilder {
    /// Empty repository with an empty `.config` and an empty home directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let repo = TestRepo { dir };
        std::fs::create_dir_all(repo.root().join(".config")).expect("create .config");
        std::fs::create_dir_all(repo.home()).expect("create home");
        Self { repo }
    }

    /// Write `.config/<rel>` in the repository, creating parents.
    pub fn with_config_file(self, rel: &str, content: &str) -> Self {
        let path = self.repo.root().join(".config").join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, content).expect("write config file");
        self
    }

    /// Write a file at the repository root (dependency lists, settings).
    pub fn with_root_file(self, name: &str, content: &str) -> Self {
        std::fs::write(self.repo.root().join(name), content).expect("write root file");
        self
    }

    /// Write a file below the home directory, creating parents.
    pub fn with_home_file(self, rel: &str, content: &str) -> Self {
        let path = self.repo.home().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, content).expect("write home file");
        self
    }

    /// Finish building.
    pub fn build(self) -> TestRepo {
        self.repo
    }
}
