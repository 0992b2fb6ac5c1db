//! # dirtsim-types::envelope
//!
//! Defines the `Envelope`, the three-field wire framing shared by the
//! binary and JSON protocols (spec §3/§4.1): `{message_type, id, payload}`.
//! The codec and registry (in `dirtsim-proto`) build on top of this shape;
//! this crate only owns the framing, not how `payload` is interpreted.

use bytes::Bytes;

/// `id == 0` means an unsolicited broadcast; any other value pairs a
/// response to the request that carried the same id on the same
/// connection (spec §3 "Correlation table").
pub const BROADCAST_ID: u64 = 0;

/// A decoded-but-not-yet-typed wire message: the name tells the registry
/// which concrete request/response/broadcast type `payload` holds.
#[derive(Clone, Debug)]
pub struct Envelope {
    /// Short identifier string matching a registered command or broadcast.
    pub message_type: String,
    /// Monotonic per-connection id; `0` for broadcasts.
    pub id: u64,
    /// Opaque bytes carrying the typed body, interpreted by the registry.
    pub payload: Bytes,
}

impl Envelope {
    pub fn request(message_type: impl Into<String>, id: u64, payload: Bytes) -> Self {
        Self {
            message_type: message_type.into(),
            id,
            payload,
        }
    }

    pub fn broadcast(message_type: impl Into<String>, payload: Bytes) -> Self {
        Self {
            message_type: message_type.into(),
            id: BROADCAST_ID,
            payload,
        }
    }

    pub fn is_broadcast(&self) -> bool {
        self.id == BROADCAST_ID
    }
}

/// Which wire protocol a connection speaks. Chosen per-connection at
/// handshake time (spec §4.3 "A send may choose binary or JSON").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    Binary,
    Json,
}

/// Maximum payload size accepted by the codec unless overridden by config
/// (spec §4.1 default 16 MB).
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 16 * 1024 * 1024;
