use clap::{ArgGroup, Parser};

use crate::tasks::{ExportSelection, InstallSelection};

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "dot-install",
    about = "Link dotfiles into ~/.config and install or export AUR/Flatpak package lists",
    version
)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .multiple(true)
        .args(["dotfiles", "aur", "flatpak", "all", "aur_export", "flatpak_export"])
))]
pub struct Cli {
    /// Link the repository's .config entries into ~/.config
    #[arg(long)]
    pub dotfiles: bool,

    /// Install packages listed in the AUR dependency file
    #[arg(long)]
    pub aur: bool,

    /// Install applications listed in the Flatpak dependency file
    #[arg(long)]
    pub flatpak: bool,

    /// Install everything: AUR packages, Flatpak applications and dotfiles
    #[arg(long)]
    pub all: bool,

    /// Write explicitly installed AUR helper packages to the AUR dependency file
    #[arg(long, conflicts_with_all = ["dotfiles", "aur", "flatpak", "all"])]
    pub aur_export: bool,

    /// Write installed Flatpak applications to the Flatpak dependency file
    #[arg(long, conflicts_with_all = ["dotfiles", "aur", "flatpak", "all"])]
    pub flatpak_export: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared by install and export runs.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Report what would change without changing anything (install only)
    #[arg(short, long)]
    pub simulate: bool,

    /// Override the repository root directory
    #[arg(long)]
    pub root: Option<std::path::PathBuf>,
}

/// What a single invocation will do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    /// Install the selected parts.
    Install(InstallSelection),
    /// Export the selected package lists.
    Export(ExportSelection),
}

impl Plan {
    /// Command name, used for the log file.
    #[must_use]
    pub const fn command_name(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Export(_) => "export",
        }
    }
}

impl Cli {
    /// Translate the flags into a [`Plan`].
    ///
    /// Argument parsing already guarantees at least one action and no mix of
    /// install and export flags.
    #[must_use]
    pub const fn plan(&self) -> Plan {
        if self.aur_export || self.flatpak_export {
            return Plan::Export(ExportSelection {
                aur: self.aur_export,
                flatpak: self.flatpak_export,
            });
        }
        Plan::Install(InstallSelection {
            dotfiles: self.all || self.dotfiles,
            aur: self.all || self.aur,
            flatpak: self.all || self.flatpak,
        })
    }
}
