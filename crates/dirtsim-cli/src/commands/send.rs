//! # dirtsim-cli::commands::send
//!
//! Implements the `send` subcommand: one command, one printed response.

use crate::args::SendOpts;
use crate::wiring::send_one_json_command;
use anyhow::Result;
use std::time::Duration;

pub async fn exec(opts: SendOpts) -> Result<()> {
    let fields: serde_json::Value = serde_json::from_str(&opts.fields)?;
    let response = send_one_json_command(&opts.url, &opts.command, fields, Duration::from_millis(opts.timeout_ms)).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
