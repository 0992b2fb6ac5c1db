//! # dirtsim-cli::commands::script
//!
//! Implements the `script` subcommand: runs a file of `CommandName {json}`
//! lines against one target, in order, printing each response as it
//! arrives. Blank lines and lines starting with `#` are skipped.

use crate::args::ScriptOpts;
use crate::wiring::send_one_json_command;
use anyhow::{anyhow, Result};
use std::time::Duration;

pub async fn exec(opts: ScriptOpts) -> Result<()> {
    let content = std::fs::read_to_string(&opts.file)?;
    let timeout = Duration::from_millis(opts.timeout_ms);

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, "{}"));
        let fields: serde_json::Value = serde_json::from_str(rest.trim())
            .map_err(|e| anyhow!("line {}: invalid JSON fields: {e}", line_no + 1))?;

        let response = send_one_json_command(&opts.url, command, fields, timeout).await?;
        println!("{command} -> {}", serde_json::to_string(&response)?);
    }
    Ok(())
}
