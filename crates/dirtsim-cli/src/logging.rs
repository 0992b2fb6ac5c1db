//! # dirtsim-cli::logging
//!
//! Initializes the global `tracing` subscriber. `--log json` is for piping
//! into a log aggregator; `--log human` is the default terminal format.

use crate::args::LogFormat;

pub fn init(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse().unwrap());
    match format {
        LogFormat::Human => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().json().with_env_filter(filter).init();
        }
    }
}
