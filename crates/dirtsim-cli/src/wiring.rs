//! # dirtsim-cli::wiring
//!
//! Instantiates and connects the pieces a running Server needs (registry,
//! dispatcher, transport, tick thread), and a minimal ad hoc JSON client
//! the `send`/`script`/`bench` subcommands share -- deliberately not
//! `dirtsim_engine::transport::outbound::OutboundClient`, since that type
//! is generic over a concrete `Command` and these subcommands only ever
//! know a command name and a JSON blob at runtime.

use anyhow::{anyhow, Result};
use dirtsim_engine::dispatcher::Dispatcher;
use dirtsim_engine::events::EventQueue;
use dirtsim_engine::settings::{MemorySettingsStore, SettingsStore, SqliteSettingsStore};
use dirtsim_engine::telemetry::TelemetryBus;
use dirtsim_engine::training_repo::{MemoryTrainingResultRepository, SqliteTrainingResultRepository, TrainingResultRepository};
use dirtsim_engine::transport::{AccessControl, ConnectionRegistry};
use dirtsim_proto::api::CommandRegistry;
use dirtsim_types::config::ServerConfig;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio_tungstenite::tungstenite::Message;

const TICK_DT_SECONDS: f64 = 1.0 / 30.0;

/// Registers every command the engine defines into a fresh registry, used
/// both by the transport listener (to validate incoming names) and by
/// `list-commands`.
pub fn build_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    dirtsim_engine::commands::register_all(&mut registry);
    registry
}

/// Builds the repositories, dispatcher, and tick thread, then serves the
/// WebSocket transport on the current tokio runtime until the process is
/// killed. Runs until `transport::listener::serve` returns, which only
/// happens on a listener bind/accept failure.
pub async fn run_server(config: ServerConfig) -> Result<()> {
    let training_repo: Box<dyn TrainingResultRepository> = match &config.training_result_db_path {
        Some(path) => Box::new(SqliteTrainingResultRepository::open(path).map_err(|e| anyhow!(e))?),
        None => Box::new(MemoryTrainingResultRepository::default()),
    };
    let settings: Box<dyn SettingsStore> = match &config.training_result_db_path {
        Some(path) => Box::new(SqliteSettingsStore::open(path).map_err(|e| anyhow!(e))?),
        None => Box::new(MemorySettingsStore::default()),
    };

    let (snapshot_tx, _snapshot_rx) = crossbeam_channel::unbounded();
    let telemetry = TelemetryBus::new(snapshot_tx);
    let queue = EventQueue::bounded(256);
    let (broadcast_tx, broadcast_rx) = crossbeam_channel::unbounded();
    let access_control = Arc::new(AccessControl::new(config.transport.network_access_enabled, config.transport.access_token.clone()));
    let connections = Arc::new(ConnectionRegistry::default());

    let mut dispatcher = Dispatcher::new(
        training_repo,
        settings,
        telemetry,
        queue,
        broadcast_tx,
        access_control.clone(),
        connections.clone(),
    );
    dispatcher.start();
    let event_sender = dispatcher.sender();

    spawn_tick_thread(event_sender.clone());
    std::thread::spawn(move || dispatcher.run());

    let registry = build_registry();
    dirtsim_engine::transport::listener::serve(config.transport, registry, event_sender, broadcast_rx, connections, access_control).await
}

/// Pushes a fixed-rate `Event::Tick` from a dedicated thread, the same
/// role the teacher's simulation thread plays for its own step loop --
/// except here ticking is wall-clock driven rather than event-time driven.
fn spawn_tick_thread(event_sender: dirtsim_engine::events::EventSender) {
    std::thread::spawn(move || {
        let mut insert_seq: u64 = 0;
        loop {
            std::thread::sleep(Duration::from_secs_f64(TICK_DT_SECONDS));
            event_sender.push(insert_seq, dirtsim_engine::events::Event::Tick { dt_seconds: TICK_DT_SECONDS });
            insert_seq = insert_seq.wrapping_add(1);
        }
    });
}

/// Connects to `url`, sends one JSON request frame, and returns the first
/// frame back that isn't a broadcast (`_type` field). Good enough for a
/// single in-flight request per connection, which is all these
/// subcommands ever have open at once.
pub async fn send_one_json_command(url: &str, command: &str, fields: serde_json::Value, timeout: Duration) -> Result<serde_json::Value> {
    let (stream, _) = tokio_tungstenite::connect_async(url).await.map_err(|e| anyhow!("connect to {url}: {e}"))?;
    let (mut sink, mut source) = stream.split();

    let frame = dirtsim_proto::codec::encode_json_request(command, fields);
    sink.send(Message::Text(frame.to_string())).await.map_err(|e| anyhow!("write: {e}"))?;

    tokio::time::timeout(timeout, async {
        loop {
            let message = source.next().await.ok_or_else(|| anyhow!("connection closed before a response arrived"))??;
            let Message::Text(text) = message else { continue };
            let value: serde_json::Value = serde_json::from_str(&text)?;
            if value.get("_type").is_some() {
                continue;
            }
            return Ok(value);
        }
    })
    .await
    .map_err(|_| anyhow!("timed out waiting for a response"))?
}
