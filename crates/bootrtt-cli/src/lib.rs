#![forbid(unsafe_code)]

use crate::config::BootRttAction;
use clap::Parser;
use config::Args;

mod app;
mod config;
mod print;
mod report;

/// Run the bootrtt application.
pub fn bootrtt() -> anyhow::Result<()> {
    let args = Args::parse();
    match BootRttAction::from(args)? {
        BootRttAction::Probe(cfg) => app::run_bootrtt(&cfg)?,
        BootRttAction::Respond(cfg) => app::run_responder(&cfg)?,
        BootRttAction::PrintConfigTemplate => print::print_config_template(),
        BootRttAction::PrintManPage => print::print_man_page()?,
        BootRttAction::PrintShellCompletions(shell) => print::print_shell_completions(shell)?,
    }
    Ok(())
}
