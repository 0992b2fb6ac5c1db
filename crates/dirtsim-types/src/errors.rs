//! # dirtsim-types::errors
//!
//! Defines the error taxonomy shared across the workspace. Every command
//! response is `Result<Okay, ApiError>` — failures never escape as
//! exceptions across the transport boundary (spec §7).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The structured failure carried in a command response. `kind` drives
/// client-side handling; `message` is for humans (CLI printout, UI toast).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn state_mismatch(current_state: &str, command: &str) -> Self {
        Self::new(
            ApiErrorKind::StateMismatch,
            format!("command '{command}' is not accepted in state '{current_state}'"),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Validation, message)
    }

    pub fn resource_unavailable(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::ResourceUnavailable, message)
    }

    pub fn busy(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Busy, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Internal, message)
    }
}

/// Error kinds, not type names (spec §7). None of these, on their own,
/// change the state machine's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ApiErrorKind {
    Transport,
    Schema,
    StateMismatch,
    Validation,
    ResourceUnavailable,
    Busy,
    Internal,
}

impl std::fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ApiErrorKind::Transport => "Transport",
            ApiErrorKind::Schema => "Schema",
            ApiErrorKind::StateMismatch => "StateMismatch",
            ApiErrorKind::Validation => "Validation",
            ApiErrorKind::ResourceUnavailable => "ResourceUnavailable",
            ApiErrorKind::Busy => "Busy",
            ApiErrorKind::Internal => "Internal",
        };
        write!(f, "{s}")
    }
}

/// Wire-level failures: decode errors, size limits. Distinct from
/// `ApiErrorKind::Schema`/`Transport` because these can occur before a
/// command name is even known, so they carry no `id` to respond on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("command '{0}' is not registered")]
    UnknownCommand(String),
    #[error("field '{field}' missing or wrong type while decoding '{command}'")]
    SchemaMismatch { command: String, field: String },
    #[error("payload of {actual} bytes exceeds configured max of {max} bytes")]
    SizeExceeded { actual: usize, max: usize },
    #[error("payload truncated: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("{0}")]
    Other(String),
}

/// Transport-level failures (spec §4.3/§7). Never state-changing; surfaced
/// only to the caller of the request that triggered them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection closed")]
    Closed,
    #[error("timed out waiting for response")]
    Timeout,
    #[error("handshake rejected: {0}")]
    HandshakeRejected(String),
    #[error("write failed: {0}")]
    WriteFailed(String),
    #[error("decode failed: {0}")]
    Decode(#[from] CodecError),
    #[error("response sink dropped without completing")]
    Dropped,
}
