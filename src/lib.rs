//! Personal machine bootstrap.
//!
//! Links the entries of a dotfiles repository's `.config` directory into
//! `~/.config`, and installs or exports the AUR and Flatpak package lists kept
//! next to it.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: repository root, optional `dot-install.toml`, dependency list files
//! - **[`resources`]**: idempotent `check + apply` primitives (symlinks, copies, package commands)
//! - **[`tasks`]**: named units of work wired to resources
//! - **[`commands`]**: top-level orchestration (`install`, `export`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod resources;
pub mod tasks;
