//! # dirtsim-cli
//!
//! The entry point for the `dirtsim` binary: parses command-line
//! arguments and dispatches to the appropriate subcommand handler.

#![forbid(unsafe_code)]

use crate::args::{Cli, Command};
use anyhow::Result;
use clap::Parser;

mod args;
mod commands;
mod logging;
mod wiring;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    logging::init(args.log);

    match args.command {
        Command::Serve(opts) => commands::serve::exec(opts).await,
        Command::Send(opts) => commands::send::exec(opts).await,
        Command::Script(opts) => commands::script::exec(opts).await,
        Command::Bench(opts) => commands::bench::exec(opts).await,
        Command::ListCommands => commands::list_commands::exec(),
    }
}
