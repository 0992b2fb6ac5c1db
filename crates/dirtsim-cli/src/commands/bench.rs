//! # dirtsim-cli::commands::bench
//!
//! Implements the `bench` subcommand: sends the same command `count`
//! times back to back over fresh connections, reporting latency and
//! exiting per spec §6 (0 on completion, 1 on the first transport or
//! protocol failure).

use crate::args::BenchOpts;
use crate::wiring::send_one_json_command;
use anyhow::{anyhow, Result};
use std::time::{Duration, Instant};

pub async fn exec(opts: BenchOpts) -> Result<()> {
    let fields: serde_json::Value = serde_json::from_str(&opts.fields)?;
    let timeout = Duration::from_millis(opts.timeout_ms);

    let mut latencies = Vec::with_capacity(opts.count as usize);
    let started = Instant::now();

    for i in 0..opts.count {
        let call_started = Instant::now();
        let response = send_one_json_command(&opts.url, &opts.command, fields.clone(), timeout)
            .await
            .map_err(|e| anyhow!("call {i}: {e}"))?;
        if response.get("error").is_some() {
            return Err(anyhow!("call {i}: server returned an error: {response}"));
        }
        latencies.push(call_started.elapsed());
    }

    let total = started.elapsed();
    let avg_ms = latencies.iter().map(|d| d.as_secs_f64() * 1000.0).sum::<f64>() / latencies.len().max(1) as f64;
    println!("{} calls in {:.3}s, avg {:.2}ms/call", opts.count, total.as_secs_f64(), avg_ms);
    Ok(())
}
