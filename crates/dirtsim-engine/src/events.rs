//! # dirtsim-engine::events
//!
//! The dispatcher's event stream. Unlike a discrete-event simulator that
//! schedules work against a simulated clock, the Server runs in real time:
//! every event is handled in the order it arrives, stamped with an
//! insertion sequence purely so two events that land in the same channel
//! recv batch still have a deterministic order for tests and replay.

use dirtsim_types::errors::ApiError;
use dirtsim_types::id::ConnectionId;

/// A decoded command, still carrying its request body as JSON (the
/// registry's `DecodedRequest` shape) plus a closure the transport gave us
/// to deliver the eventual JSON response over whichever wire format the
/// connection negotiated. One `CommandInvocation` is exactly one CWC; the
/// dispatcher completes `respond` exactly once.
pub struct CommandInvocation {
    pub connection_id: ConnectionId,
    pub name: &'static str,
    pub request_json: serde_json::Value,
    pub respond: Box<dyn FnOnce(Result<serde_json::Value, ApiError>) + Send>,
}

impl std::fmt::Debug for CommandInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandInvocation")
            .field("connection_id", &self.connection_id)
            .field("name", &self.name)
            .finish()
    }
}

/// First-class events the dispatcher folds into `ServerState`.
#[derive(Debug)]
pub enum Event {
    Command(CommandInvocation),
    /// A connection's socket closed; any subscriptions tied to it are torn down.
    ConnectionClosed { connection_id: ConnectionId },
    /// The fixed-rate tick driving `World::advance_time` and, during
    /// `Evolution`, one trainer tick-protocol step.
    Tick { dt_seconds: f64 },
    /// An unsolicited broadcast arriving on an outbound connection to a
    /// peer (the UI's connection to the Server), folded into the
    /// receiver's own event queue the same way an inbound command is
    /// (spec §4.9: "its own state transitions react to responses and to
    /// broadcasts"). The Server has no outbound connection of its own and
    /// never produces this.
    ServerBroadcast { message_type: String, json: serde_json::Value },
}

/// Stamps an `Event` with its position in arrival order.
#[derive(Debug)]
pub struct Queued {
    pub insert_seq: u64,
    pub event: Event,
}

/// A plain FIFO over `Queued` events, backed by a bounded crossbeam channel
/// so a slow dispatcher applies backpressure to producers instead of
/// growing without bound.
pub struct EventQueue {
    sender: crossbeam_channel::Sender<Queued>,
    receiver: crossbeam_channel::Receiver<Queued>,
}

impl EventQueue {
    pub fn bounded(capacity: usize) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        Self { sender, receiver }
    }

    pub fn sender(&self) -> EventSender {
        EventSender { sender: self.sender.clone() }
    }

    /// Blocks until an event is available or every sender has dropped.
    pub fn recv(&self) -> Option<Queued> {
        self.receiver.recv().ok()
    }

    /// Drains whatever is immediately available without blocking, for the
    /// dispatcher's drain-then-tick loop.
    pub fn drain_available(&self) -> Vec<Queued> {
        self.receiver.try_iter().collect()
    }
}

#[derive(Clone)]
pub struct EventSender {
    sender: crossbeam_channel::Sender<Queued>,
}

impl EventSender {
    pub fn push(&self, insert_seq: u64, event: Event) {
        let _ = self.sender.send(Queued { insert_seq, event });
    }
}

/// An unsolicited, `id=0` message originated by the Server and fanned out
/// to every connected transport (spec §3 "Correlation table", §4.3). The
/// dispatcher never addresses a specific connection; the transport layer
/// owns subscriber fan-out.
#[derive(Debug, Clone)]
pub struct Broadcast {
    pub message_type: &'static str,
    pub json: serde_json::Value,
}
