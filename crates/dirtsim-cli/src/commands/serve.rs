//! # dirtsim-cli::commands::serve
//!
//! Implements the `serve` subcommand.

use crate::args::{Role, ServeOpts};
use crate::wiring;
use anyhow::Result;
use dirtsim_engine::config_io::{load_server_config, load_ui_config};

pub async fn exec(opts: ServeOpts) -> Result<()> {
    match opts.role {
        Role::Server => {
            let config = match &opts.config {
                Some(path) => load_server_config(path)?,
                None => Default::default(),
            };
            println!("dirtsim server listening on port {}", config.transport.port);
            wiring::run_server(config).await
        }
        Role::Ui => {
            let config = match &opts.config {
                Some(path) => load_ui_config(path)?,
                None => Default::default(),
            };
            println!("dirtsim UI listening on port {}, forwarding to {}", config.transport.port, config.server_url);
            dirtsim_ui::wiring::run(config).await
        }
    }
}
