//! # dirtsim-engine::transport::outbound
//!
//! The outbound client half of spec §4.3: connects to a peer speaking the
//! same envelope (the UI forwards authoritative mutations to the Server
//! this way) and exposes `send_command_and_get_response`, built atop the
//! same `CorrelationTable` the spec names.

use bytes::Bytes;
use dirtsim_proto::api::Command;
use dirtsim_proto::codec;
use dirtsim_proto::correlation::CorrelationTable;
use dirtsim_types::envelope::{Envelope, WireFormat};
use dirtsim_types::errors::{ApiError, ApiErrorKind, TransportError};
use futures_util::{SinkExt, StreamExt};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_tungstenite::tungstenite::Message;

/// An unsolicited, `id=0` frame received on this connection, routed by
/// `message_type` (spec §4.3: "receivers of `id=0` must route by
/// `message_type`, not by pending-correlation table").
#[derive(Debug, Clone)]
pub struct ReceivedBroadcast {
    pub message_type: String,
    pub json: serde_json::Value,
}

/// One outbound WebSocket connection. Owns a reader task (completes the
/// correlation table, routes broadcasts) and a writer task (serializes
/// outgoing frames), connected to the caller only through `writer_tx` and
/// `correlation`.
pub struct OutboundClient {
    writer_tx: tokio::sync::mpsc::UnboundedSender<Message>,
    correlation: Arc<Mutex<CorrelationTable>>,
    format: WireFormat,
}

impl OutboundClient {
    /// Connects to `url` and spawns its reader/writer tasks. `on_broadcast`
    /// is invoked on the reader task for every `id=0` frame that arrives;
    /// keep it cheap or hand off to a channel of its own.
    pub async fn connect(
        url: &str,
        format: WireFormat,
        default_timeout: Duration,
        on_broadcast: impl Fn(ReceivedBroadcast) + Send + 'static,
    ) -> Result<Self, TransportError> {
        let (stream, _) = tokio_tungstenite::connect_async(url).await.map_err(|e| TransportError::HandshakeRejected(e.to_string()))?;
        let (mut sink, mut source) = stream.split();
        let (writer_tx, mut writer_rx) = tokio::sync::mpsc::unbounded_channel::<Message>();
        let correlation = Arc::new(Mutex::new(CorrelationTable::new(default_timeout)));

        tokio::spawn(async move {
            while let Some(message) = writer_rx.recv().await {
                if sink.send(message).await.is_err() {
                    break;
                }
            }
        });

        let reader_correlation = correlation.clone();
        tokio::spawn(async move {
            while let Some(message) = source.next().await {
                match message {
                    Ok(Message::Binary(bytes)) => handle_binary_frame(Bytes::from(bytes), &reader_correlation, &on_broadcast),
                    Ok(Message::Text(text)) => handle_text_frame(&text, &reader_correlation, &on_broadcast),
                    Ok(Message::Close(_)) | Err(_) => break,
                    _ => {}
                }
            }
            reader_correlation.lock().unwrap().cancel_all(TransportError::Closed);
        });

        Ok(Self { writer_tx, correlation, format })
    }

    /// Allocates the next id, writes the request envelope, and blocks the
    /// calling thread until the response arrives or `timeout` elapses.
    /// Must be called from a thread other than the one driving this
    /// client's own reader task, or the wait can never be satisfied.
    pub fn send_command_and_get_response<C: Command>(&self, request: C::Request, timeout: Option<Duration>) -> Result<C::Okay, ApiError> {
        let (id, rx) = self.correlation.lock().unwrap().begin(timeout);
        let message = self.encode_request::<C>(id, &request)?;
        self.writer_tx
            .send(message)
            .map_err(|_| ApiError::new(ApiErrorKind::Transport, TransportError::Closed.to_string()))?;

        let payload = rx
            .recv_timeout(timeout.unwrap_or(Duration::from_secs(5)))
            .map_err(|_| ApiError::new(ApiErrorKind::Transport, TransportError::Timeout.to_string()))?
            .map_err(|err| ApiError::new(ApiErrorKind::Transport, err.to_string()))?;

        self.decode_response::<C>(&payload)
    }

    fn encode_request<C: Command>(&self, id: u64, request: &C::Request) -> Result<Message, ApiError> {
        match self.format {
            WireFormat::Json => {
                let fields = serde_json::to_value(request).map_err(|e| ApiError::internal(e.to_string()))?;
                let frame = codec::encode_json_request(C::NAME, fields);
                Ok(Message::Text(frame.to_string()))
            }
            WireFormat::Binary => {
                let payload = postcard::to_allocvec(request).map_err(|e| ApiError::internal(e.to_string()))?;
                Ok(Message::Binary(codec::encode_binary(&Envelope::request(C::NAME, id, Bytes::from(payload))).to_vec()))
            }
        }
    }

    fn decode_response<C: Command>(&self, payload: &[u8]) -> Result<C::Okay, ApiError> {
        match self.format {
            WireFormat::Binary => {
                let result = codec::decode_binary_response(payload).map_err(|e| ApiError::internal(e.to_string()))?;
                let value = result?;
                serde_json::from_value(value).map_err(|e| ApiError::internal(e.to_string()))
            }
            WireFormat::Json => {
                let value: serde_json::Value = serde_json::from_slice(payload).map_err(|e| ApiError::internal(e.to_string()))?;
                if let Some(error) = value.get("error") {
                    let message = error.get("message").and_then(|m| m.as_str()).unwrap_or("unknown error").to_string();
                    return Err(ApiError::internal(message));
                }
                let okay = value.get("value").cloned().unwrap_or(serde_json::Value::Null);
                serde_json::from_value(okay).map_err(|e| ApiError::internal(e.to_string()))
            }
        }
    }
}

fn handle_binary_frame(bytes: Bytes, correlation: &Arc<Mutex<CorrelationTable>>, on_broadcast: &impl Fn(ReceivedBroadcast)) {
    let Ok(env) = codec::decode_binary(bytes, dirtsim_types::envelope::DEFAULT_MAX_PAYLOAD_BYTES) else { return };
    if env.is_broadcast() {
        if let Ok(json) = codec::decode_binary_broadcast(&env.payload) {
            on_broadcast(ReceivedBroadcast { message_type: env.message_type, json });
        }
        return;
    }
    correlation.lock().unwrap().complete(env.id, env.payload);
}

fn handle_text_frame(text: &str, correlation: &Arc<Mutex<CorrelationTable>>, on_broadcast: &impl Fn(ReceivedBroadcast)) {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(text) else { return };
    if let Some(message_type) = value.get("_type").and_then(|v| v.as_str()) {
        on_broadcast(ReceivedBroadcast { message_type: message_type.to_string(), json: value });
        return;
    }
    let Some(id) = value.get("id").and_then(|v| v.as_u64()) else { return };
    let payload = serde_json::to_vec(&value).unwrap_or_default();
    correlation.lock().unwrap().complete(id, Bytes::from(payload));
}
