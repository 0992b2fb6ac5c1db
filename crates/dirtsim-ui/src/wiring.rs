//! # dirtsim-ui::wiring
//!
//! Instantiates and connects the pieces a running UI process needs: an
//! outbound connection to the Server, the `UiDispatcher`, and the UI's
//! own WebSocket listener (reusing `dirtsim_engine::transport::listener`
//! verbatim -- it's generic over the registry and event sender, so the
//! UI's distinct command surface plugs in the same way the Server's does).

use crate::dispatcher::UiDispatcher;
use anyhow::Result;
use dirtsim_engine::events::{Event, EventQueue, EventSender};
use dirtsim_engine::telemetry::TelemetryBus;
use dirtsim_engine::transport::outbound::{OutboundClient, ReceivedBroadcast};
use dirtsim_engine::transport::{AccessControl, ConnectionRegistry};
use dirtsim_types::config::UiConfig;
use dirtsim_types::envelope::WireFormat;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Connects to the Server, spawns the dispatcher thread, and serves the
/// UI's own listener until it returns (only on a bind/accept failure).
/// A Server that isn't reachable at startup doesn't abort the process --
/// the UI comes up `Disconnected` and every forwarding command fails with
/// a transport error until an operator points it at a live Server.
pub async fn run(config: UiConfig) -> Result<()> {
    let (snapshot_tx, _snapshot_rx) = crossbeam_channel::unbounded();
    let telemetry = TelemetryBus::new(snapshot_tx);
    let queue = EventQueue::bounded(256);
    let event_sender = queue.sender();
    let (broadcast_tx, broadcast_rx) = crossbeam_channel::unbounded();
    let (status_tx, status_rx) = crossbeam_channel::bounded(16);
    let access_control = Arc::new(AccessControl::new(config.transport.network_access_enabled, config.transport.access_token.clone()));
    let connections = Arc::new(ConnectionRegistry::default());

    let outbound = connect_to_server(&config, event_sender.clone()).await;

    let mut dispatcher = UiDispatcher::new(
        telemetry,
        queue,
        broadcast_tx,
        status_tx,
        access_control.clone(),
        Duration::from_millis(config.transport.default_timeout_ms),
        outbound,
    );
    std::thread::spawn(move || dispatcher.run());

    let local_sender = event_sender.clone();
    tokio::task::spawn_blocking(move || {
        if let Err(err) = crate::run_tui(status_rx, local_sender) {
            tracing::error!(%err, "dashboard exited with an error");
        }
    });

    let mut registry = dirtsim_proto::api::CommandRegistry::new();
    crate::commands::register_all(&mut registry);

    dirtsim_engine::transport::listener::serve(config.transport, registry, event_sender, broadcast_rx, connections, access_control).await
}

async fn connect_to_server(config: &UiConfig, event_sender: EventSender) -> Option<Arc<OutboundClient>> {
    let url = format!("{}/ws", config.server_url.trim_end_matches('/'));
    let default_timeout = Duration::from_millis(config.transport.default_timeout_ms);
    let insert_seq = Arc::new(AtomicU64::new(0));
    match OutboundClient::connect(&url, WireFormat::Json, default_timeout, move |broadcast: ReceivedBroadcast| {
        let seq = insert_seq.fetch_add(1, Ordering::Relaxed);
        event_sender.push(seq, Event::ServerBroadcast { message_type: broadcast.message_type, json: broadcast.json });
    })
    .await
    {
        Ok(client) => Some(Arc::new(client)),
        Err(err) => {
            tracing::warn!(%url, %err, "could not connect to the Server at startup, starting Disconnected");
            None
        }
    }
}
