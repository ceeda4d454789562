use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use dot_install::cli::{Cli, Plan};
use dot_install::{commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    let plan = args.plan();

    logging::init_subscriber(args.verbose, plan.command_name());
    let log = Arc::new(logging::Logger::new(plan.command_name()));

    match plan {
        Plan::Install(selection) => commands::install::run(&args.global, selection, &log),
        Plan::Export(selection) => commands::export::run(&args.global, selection, &log),
    }
}
