//! # dirtsim-proto::api
//!
//! Defines the command registry: at process start, every command type is
//! registered under its own name, giving `name -> {deserialize, dispatch,
//! has_response}` (spec §4.2). Erases each command's concrete request/okay
//! types behind `CommandEntry` the same way the registry's author would
//! type-erase a handler — callers look up by `message_type` string and get
//! back something they can hand a payload and a response sink.

use crate::ctx_ext::{Cwc, ResponseSink};
use bytes::Bytes;
use dirtsim_types::envelope::WireFormat;
use dirtsim_types::errors::{ApiError, CodecError};
use indexmap::IndexMap;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

/// Whether a command's handler owes the caller a response, or just
/// acknowledges receipt and defers (trainer handlers complete later, but
/// every command still eventually yields exactly one response, spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerShape {
    RequestResponse,
}

/// Implemented once per command type. `NAME` must equal the string the
/// registry indexes it under — enforced at registration, not by the type
/// system, mirroring the teacher's "name is the type's own constexpr
/// name" invariant (spec §3 "Command descriptor").
pub trait Command: Debug + Send + 'static {
    /// Canonical name, also the `message_type` / JSON `command` field.
    const NAME: &'static str;
    type Request: DeserializeOwned + Serialize + Debug + Send + 'static;
    type Okay: DeserializeOwned + Serialize + Debug + Send + 'static;
}

/// A type-erased registration: decode a payload into the concrete
/// request, build the CWC, and hand both to the caller's dispatch
/// closure. Constructed once per command type via [`CommandRegistry::register`].
pub struct CommandEntry {
    name: &'static str,
    decode: Box<dyn Fn(WireFormat, &Bytes) -> Result<DecodedRequest, CodecError> + Send + Sync>,
}

/// A decoded request body, still type-erased as JSON/postcard-compatible
/// bytes the dispatcher re-decodes into the concrete type it expects.
/// Kept opaque here so the registry itself never needs to know concrete
/// command types beyond what's needed to validate and re-frame a payload.
pub struct DecodedRequest {
    pub json: serde_json::Value,
}

impl CommandEntry {
    fn new<C: Command>() -> Self {
        Self {
            name: C::NAME,
            decode: Box::new(|format, payload| match format {
                WireFormat::Binary => {
                    let req: C::Request = postcard::from_bytes(payload).map_err(|e| {
                        CodecError::SchemaMismatch {
                            command: C::NAME.to_string(),
                            field: e.to_string(),
                        }
                    })?;
                    let json = serde_json::to_value(&req).map_err(|e| {
                        CodecError::Other(format!("re-framing '{}': {e}", C::NAME))
                    })?;
                    Ok(DecodedRequest { json })
                }
                WireFormat::Json => {
                    let value: serde_json::Value =
                        serde_json::from_slice(payload).map_err(|e| CodecError::SchemaMismatch {
                            command: C::NAME.to_string(),
                            field: e.to_string(),
                        })?;
                    Ok(DecodedRequest { json: value })
                }
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn decode(
        &self,
        format: WireFormat,
        payload: &Bytes,
    ) -> Result<DecodedRequest, CodecError> {
        (self.decode)(format, payload)
    }
}

/// The static `name -> entry` table a process builds once at startup.
/// Server and UI each own a distinct registry (spec §4.2): a command name
/// may be registered independently on each.
#[derive(Default)]
pub struct CommandRegistry {
    entries: IndexMap<&'static str, CommandEntry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Registers `C`. Panics on a duplicate name — that's a programming
    /// error caught at startup, not a runtime condition.
    pub fn register<C: Command>(&mut self) -> &mut Self {
        let prev = self.entries.insert(C::NAME, CommandEntry::new::<C>());
        assert!(
            prev.is_none(),
            "duplicate command registration for '{}'",
            C::NAME
        );
        self
    }

    pub fn lookup(&self, name: &str) -> Option<&CommandEntry> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }
}

/// Builds a CWC for an unrecognized command name: the caller gets a
/// `Schema` error through the normal response path instead of a dropped
/// connection.
pub fn unknown_command_response(name: &str) -> Result<(), ApiError> {
    Err(ApiError::new(
        dirtsim_types::errors::ApiErrorKind::Schema,
        format!("command '{name}' is not registered"),
    ))
}

/// Convenience used by transports constructing a CWC for a decoded,
/// registered command.
pub fn cwc_for<C: Command>(request: C::Request, sink: ResponseSink<C::Okay>) -> Cwc<C> {
    Cwc::new(request, sink)
}
