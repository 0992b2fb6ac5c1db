//! # dirtsim-engine::transport::listener
//!
//! The accept loop half of spec §4.3: binds a port, upgrades each TCP
//! connection to a WebSocket, and turns its frames into `CommandInvocation`s
//! on the dispatcher's event queue. Everything here runs on the async
//! runtime's own threads; none of it touches `ServerState` directly.

use super::{AccessControl, ConnectionIdAllocator, ConnectionRegistry, ConnectionSender};
use crate::events::{CommandInvocation, Event, EventSender};
use axum::extract::connect_info::ConnectInfo;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use dirtsim_proto::api::CommandRegistry;
use dirtsim_proto::codec;
use dirtsim_types::envelope::WireFormat;
use dirtsim_types::errors::ApiError;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

struct AppState {
    registry: Arc<CommandRegistry>,
    event_sender: EventSender,
    connections: Arc<ConnectionRegistry>,
    connection_ids: ConnectionIdAllocator,
    next_insert_seq: AtomicU64,
    config: dirtsim_types::config::TransportConfig,
    access_control: Arc<AccessControl>,
}

/// Binds `config.port` on `0.0.0.0` and serves WebSocket connections
/// until the process exits. Non-loopback peers are admitted or refused
/// per `access_control` rather than by the bind address -- `access_control`
/// starts seeded from `config.network_access_enabled`/`access_token` and
/// is re-armed at runtime by `WebSocketAccessSet` (spec §4.3, §6, §8).
/// `connections` is shared with the caller so a command handler elsewhere
/// can force-disconnect non-loopback peers on the same registry this
/// listener populates.
pub async fn serve(
    config: dirtsim_types::config::TransportConfig,
    registry: CommandRegistry,
    event_sender: EventSender,
    broadcast_rx: crossbeam_channel::Receiver<crate::events::Broadcast>,
    connections: Arc<ConnectionRegistry>,
    access_control: Arc<AccessControl>,
) -> anyhow::Result<()> {
    spawn_broadcast_fanout(connections.clone(), broadcast_rx);

    let state = Arc::new(AppState {
        registry: Arc::new(registry),
        event_sender,
        connections,
        connection_ids: ConnectionIdAllocator::default(),
        next_insert_seq: AtomicU64::new(0),
        config: config.clone(),
        access_control,
    });

    let app = axum::Router::new()
        .route("/ws", axum::routing::get(ws_upgrade))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from((std::net::Ipv4Addr::UNSPECIFIED, config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "dirtsim transport listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}

/// Runs on its own thread rather than a tokio task: `broadcast_rx` is a
/// blocking crossbeam receiver and every connection's outbound sender
/// accepts synchronous `send` calls, so no async runtime is needed here.
fn spawn_broadcast_fanout(connections: Arc<ConnectionRegistry>, rx: crossbeam_channel::Receiver<crate::events::Broadcast>) {
    std::thread::spawn(move || {
        while let Ok(broadcast) = rx.recv() {
            connections.fan_out(&broadcast);
        }
    });
}

async fn ws_upgrade(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    if !addr.ip().is_loopback() {
        if !state.access_control.is_enabled() {
            return (StatusCode::FORBIDDEN, "network access disabled").into_response();
        }
        let provided = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .unwrap_or("");
        if !state.access_control.check_token(provided) {
            return (StatusCode::UNAUTHORIZED, "unauthorized").into_response();
        }
    }
    ws.on_upgrade(move |socket| handle_socket(socket, state, addr))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, addr: SocketAddr) {
    let connection_id = state.connection_ids.next();
    let (mut ws_sink, mut ws_stream) = socket.split();
    let (out_tx, mut out_rx) = tokio::sync::mpsc::unbounded_channel::<Message>();
    let disconnect = Arc::new(tokio::sync::Notify::new());

    state.connections.insert(
        connection_id,
        ConnectionSender { format: WireFormat::Json, tx: out_tx.clone(), addr, disconnect: disconnect.clone() },
    );

    let writer = tokio::spawn(async move {
        while let Some(message) = out_rx.recv().await {
            if ws_sink.send(message).await.is_err() {
                break;
            }
        }
    });

    // One JSON request carries no wire id of its own (spec §4.1: `{command,
    // ...fields}`), so the listener mints one per connection to pair a
    // response back; binary requests already carry their sender's id.
    let mut next_json_id: u64 = 1;

    loop {
        tokio::select! {
            message = ws_stream.next() => {
                let Some(Ok(message)) = message else { break };
                match message {
                    Message::Text(text) => {
                        state.connections.set_format(connection_id, WireFormat::Json);
                        let id = next_json_id;
                        next_json_id = next_json_id.wrapping_add(1).max(1);
                        dispatch_json_frame(&state, connection_id, id, text, &out_tx);
                    }
                    Message::Binary(bytes) => {
                        state.connections.set_format(connection_id, WireFormat::Binary);
                        dispatch_binary_frame(&state, connection_id, bytes::Bytes::from(bytes), &out_tx);
                    }
                    Message::Close(_) => break,
                    Message::Ping(_) | Message::Pong(_) => {}
                }
            }
            // `WebSocketAccessSet{enabled: false}` wakes every non-loopback
            // connection's registry entry; exiting the loop here is what
            // "closed within one tick" means in practice -- the next poll
            // of this select, not a fixed timer.
            _ = disconnect.notified() => break,
        }
    }

    state.connections.remove(connection_id);
    let seq = state.next_insert_seq.fetch_add(1, Ordering::Relaxed);
    state.event_sender.push(seq, Event::ConnectionClosed { connection_id });
    writer.abort();
}

fn dispatch_json_frame(
    state: &Arc<AppState>,
    connection_id: dirtsim_types::id::ConnectionId,
    id: u64,
    text: String,
    out_tx: &tokio::sync::mpsc::UnboundedSender<Message>,
) {
    let respond = |out_tx: tokio::sync::mpsc::UnboundedSender<Message>, result: Result<serde_json::Value, ApiError>| {
        let frame = codec::encode_json_response(id, &result);
        let _ = out_tx.send(Message::Text(frame.to_string()));
    };

    let value: serde_json::Value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(err) => {
            respond(out_tx.clone(), Err(ApiError::new(dirtsim_types::errors::ApiErrorKind::Schema, err.to_string())));
            return;
        }
    };
    let (name, fields) = match codec::decode_json_request(value) {
        Ok(pair) => pair,
        Err(err) => {
            respond(out_tx.clone(), Err(ApiError::new(dirtsim_types::errors::ApiErrorKind::Schema, err.to_string())));
            return;
        }
    };
    let Some(entry) = state.registry.lookup(&name) else {
        respond(out_tx.clone(), Err(ApiError::new(dirtsim_types::errors::ApiErrorKind::Schema, format!("command '{name}' is not registered"))));
        return;
    };
    let payload = serde_json::to_vec(&fields).unwrap_or_default();
    let decoded = match entry.decode(WireFormat::Json, &bytes::Bytes::from(payload)) {
        Ok(decoded) => decoded,
        Err(err) => {
            respond(out_tx.clone(), Err(ApiError::new(dirtsim_types::errors::ApiErrorKind::Schema, err.to_string())));
            return;
        }
    };

    let out_tx = out_tx.clone();
    let invocation = CommandInvocation {
        connection_id,
        name: entry.name(),
        request_json: decoded.json,
        respond: Box::new(move |result| respond(out_tx, result)),
    };
    let seq = state.next_insert_seq.fetch_add(1, Ordering::Relaxed);
    state.event_sender.push(seq, Event::Command(invocation));
}

fn dispatch_binary_frame(
    state: &Arc<AppState>,
    connection_id: dirtsim_types::id::ConnectionId,
    bytes: bytes::Bytes,
    out_tx: &tokio::sync::mpsc::UnboundedSender<Message>,
) {
    let env = match codec::decode_binary(bytes, state.config.max_payload_bytes) {
        Ok(env) => env,
        Err(_) => return,
    };
    let id = env.id;
    let respond = |out_tx: tokio::sync::mpsc::UnboundedSender<Message>, name: &'static str, result: Result<serde_json::Value, ApiError>| {
        if let Ok(frame) = codec::encode_binary_response(name, id, &result) {
            let _ = out_tx.send(Message::Binary(frame.to_vec()));
        }
    };

    let Some(entry) = state.registry.lookup(&env.message_type) else {
        return;
    };
    let decoded = match entry.decode(WireFormat::Binary, &env.payload) {
        Ok(decoded) => decoded,
        Err(err) => {
            respond(out_tx.clone(), entry.name(), Err(ApiError::new(dirtsim_types::errors::ApiErrorKind::Schema, err.to_string())));
            return;
        }
    };

    let out_tx = out_tx.clone();
    let name = entry.name();
    let invocation = CommandInvocation {
        connection_id,
        name,
        request_json: decoded.json,
        respond: Box::new(move |result| respond(out_tx, name, result)),
    };
    let seq = state.next_insert_seq.fetch_add(1, Ordering::Relaxed);
    state.event_sender.push(seq, Event::Command(invocation));
}
