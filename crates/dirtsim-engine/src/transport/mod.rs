//! # dirtsim-engine::transport
//!
//! The WebSocket transport (spec §4.3): an accept loop that decodes
//! envelopes off incoming connections and feeds them into the
//! dispatcher's event queue as `CommandInvocation`s, and an outbound
//! client the UI uses to forward authoritative mutations to the Server.
//! Both share the envelope codec and command registry; neither knows
//! anything about `ServerState`.

pub mod listener;
pub mod outbound;

use dirtsim_types::envelope::WireFormat;
use dirtsim_types::id::ConnectionId;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Allocates connection ids independently of the dispatcher's own `IdGen`,
/// since the listener runs on the async runtime's threads rather than the
/// dispatcher's (spec §5: network I/O threads are producers only).
#[derive(Default)]
pub struct ConnectionIdAllocator {
    next: AtomicU64,
}

impl ConnectionIdAllocator {
    pub fn next(&self) -> ConnectionId {
        self.next.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// One registered connection's outbound half: a channel to its writer
/// task plus which wire format it negotiated, so broadcasts are framed
/// the way the connection expects. `addr` and `disconnect` exist to
/// support `WebSocketAccessSet`'s "close non-loopback connections"
/// requirement without tearing down the listener itself.
pub struct ConnectionSender {
    pub format: WireFormat,
    pub tx: tokio::sync::mpsc::UnboundedSender<axum::extract::ws::Message>,
    pub addr: SocketAddr,
    pub disconnect: Arc<tokio::sync::Notify>,
}

/// Tracks the outbound half of every currently open inbound connection so
/// a broadcast can be written to each of them (spec §4.3 "Broadcasts").
/// Every open connection receives every broadcast; `EventSubscribe` is
/// acknowledged but does not currently gate fan-out.
#[derive(Default)]
pub struct ConnectionRegistry {
    senders: Mutex<HashMap<ConnectionId, ConnectionSender>>,
}

impl ConnectionRegistry {
    pub fn insert(&self, id: ConnectionId, sender: ConnectionSender) {
        self.senders.lock().unwrap().insert(id, sender);
    }

    pub fn remove(&self, id: ConnectionId) {
        self.senders.lock().unwrap().remove(&id);
    }

    /// Updates which wire format `id` last used, so broadcasts sent after
    /// its first request frame are encoded the way that connection reads.
    pub fn set_format(&self, id: ConnectionId, format: WireFormat) {
        if let Some(sender) = self.senders.lock().unwrap().get_mut(&id) {
            sender.format = format;
        }
    }

    pub fn len(&self) -> usize {
        self.senders.lock().unwrap().len()
    }

    /// Wakes every currently connected non-loopback peer's read loop so it
    /// exits on its next poll, used when `WebSocketAccessSet{enabled:
    /// false}` revokes network access. Loopback connections are left
    /// alone.
    pub fn close_non_loopback(&self) {
        let senders = self.senders.lock().unwrap();
        for sender in senders.values() {
            if !sender.addr.ip().is_loopback() {
                sender.disconnect.notify_one();
            }
        }
    }

    /// Writes `broadcast` to every open connection, framed per-connection
    /// per its negotiated wire format. A dead sender (writer task already
    /// exited) is left for the read loop's own cleanup to remove.
    pub fn fan_out(&self, broadcast: &crate::events::Broadcast) {
        let senders = self.senders.lock().unwrap();
        for sender in senders.values() {
            let message = match sender.format {
                WireFormat::Json => {
                    let frame = dirtsim_proto::codec::encode_json_broadcast(broadcast.message_type, broadcast.json.clone());
                    axum::extract::ws::Message::Text(frame.to_string())
                }
                WireFormat::Binary => match dirtsim_proto::codec::encode_binary_broadcast(broadcast.message_type, &broadcast.json) {
                    Ok(bytes) => axum::extract::ws::Message::Binary(bytes.to_vec()),
                    Err(_) => continue,
                },
            };
            let _ = sender.tx.send(message);
        }
    }
}

/// Live, mutable view of a listener's network exposure, seeded from
/// `TransportConfig` at startup and re-armed at runtime by
/// `WebSocketAccessSet` (spec §4.3, §8 access-control scenario). The
/// listener's socket stays bound to `0.0.0.0` throughout -- enforcement
/// of "loopback only" happens in `ws_upgrade` against this struct rather
/// than by rebinding the port, which would require tearing down and
/// restarting the accept loop.
pub struct AccessControl {
    enabled: AtomicBool,
    token: Mutex<Option<String>>,
}

impl AccessControl {
    pub fn new(enabled: bool, token: Option<String>) -> Self {
        Self { enabled: AtomicBool::new(enabled), token: Mutex::new(token) }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set(&self, enabled: bool, token: Option<String>) {
        self.enabled.store(enabled, Ordering::SeqCst);
        *self.token.lock().unwrap() = token;
    }

    /// Constant-time comparison against the currently configured token.
    /// An unset or empty token always fails, even against an empty
    /// `provided`.
    pub fn check_token(&self, provided: &str) -> bool {
        let guard = self.token.lock().unwrap();
        let expected = guard.as_deref().unwrap_or("");
        !expected.is_empty() && constant_time_eq(provided.as_bytes(), expected.as_bytes())
    }
}

/// Bearer-token comparison that doesn't short-circuit on the first
/// mismatched byte (spec §4.3: "compared in constant time").
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod access_control_tests {
    use super::*;

    #[test]
    fn disabled_by_default_rejects_any_token() {
        let ac = AccessControl::new(false, None);
        assert!(!ac.is_enabled());
        assert!(!ac.check_token(""));
    }

    #[test]
    fn enabling_with_a_token_accepts_only_that_token() {
        let ac = AccessControl::new(false, None);
        ac.set(true, Some("T".to_string()));
        assert!(ac.is_enabled());
        assert!(ac.check_token("T"));
        assert!(!ac.check_token("wrong"));
    }

    #[test]
    fn disabling_clears_enabled_even_with_a_token_set() {
        let ac = AccessControl::new(true, Some("T".to_string()));
        ac.set(false, None);
        assert!(!ac.is_enabled());
    }
}
