//! # dirtsim-cli::commands
//!
//! One module per subcommand.

pub mod bench;
pub mod list_commands;
pub mod script;
pub mod send;
pub mod serve;
