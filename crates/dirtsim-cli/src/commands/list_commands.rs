//! # dirtsim-cli::commands::list_commands
//!
//! Implements the `list-commands` subcommand.

use crate::wiring::build_registry;
use anyhow::Result;

pub fn exec() -> Result<()> {
    let registry = build_registry();
    let mut names: Vec<&str> = registry.names().collect();
    names.sort_unstable();
    for name in names {
        println!("{name}");
    }
    Ok(())
}
