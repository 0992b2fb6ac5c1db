//! # dirtsim-cli::args
//!
//! Defines the command-line argument structure using `clap`.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, default_value = "human")]
    pub log: LogFormat,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a Server or UI process in this binary.
    Serve(ServeOpts),
    /// Send one command to a running Server or UI and print its response.
    Send(SendOpts),
    /// Run a newline-delimited sequence of commands from a file.
    Script(ScriptOpts),
    /// Send a command in a loop, reporting throughput and exiting per §6.
    Bench(BenchOpts),
    /// List every command name the registry knows, for scripting.
    ListCommands,
}

#[derive(Args, Debug)]
pub struct ServeOpts {
    /// Which process to run.
    #[arg(long, value_enum, default_value = "server")]
    pub role: Role,

    /// Path to a TOML config file (`ServerConfig`/`UiConfig` shape).
    /// Missing file falls back to defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SendOpts {
    /// WebSocket URL of the process to connect to.
    #[arg(long, default_value = "ws://127.0.0.1:8080/ws")]
    pub url: String,

    /// Command name, e.g. `StatusGet`.
    pub command: String,

    /// Request fields as a JSON object. Defaults to `{}`.
    #[arg(long, default_value = "{}")]
    pub fields: String,

    #[arg(long, default_value_t = 5000)]
    pub timeout_ms: u64,
}

#[derive(Args, Debug)]
pub struct ScriptOpts {
    #[arg(long, default_value = "ws://127.0.0.1:8080/ws")]
    pub url: String,

    /// One `CommandName {"field": ...}` pair per line.
    pub file: PathBuf,

    #[arg(long, default_value_t = 5000)]
    pub timeout_ms: u64,
}

#[derive(Args, Debug)]
pub struct BenchOpts {
    #[arg(long, default_value = "ws://127.0.0.1:8080/ws")]
    pub url: String,

    pub command: String,

    #[arg(long, default_value = "{}")]
    pub fields: String,

    #[arg(long, default_value_t = 100)]
    pub count: u32,

    #[arg(long, default_value_t = 5000)]
    pub timeout_ms: u64,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Server,
    Ui,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}
