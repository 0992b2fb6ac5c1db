//! # dirtsim-proto::ctx_ext
//!
//! Defines the command-with-callback (CWC): a decoded request body paired
//! with a one-shot response sink (spec §3 "Command-with-callback", §4.4
//! "Cancellation"). Dispatching a CWC delivers the response exactly once,
//! whether the handler completes synchronously or is ticked across many
//! outer loop iterations (trainer handlers, §4.6).

use crate::api::Command;
use dirtsim_types::errors::{ApiError, ApiErrorKind, TransportError};
use std::marker::PhantomData;

/// The sending half of a one-shot response channel. Completing it twice
/// is a logic error (debug-asserted); dropping it without completing
/// marks the pending entry `Dropped` so the client is never left hanging
/// (spec §9 "One-shot response sinks").
pub struct ResponseSink<Okay> {
    inner: Option<crossbeam_channel::Sender<Result<Okay, ApiError>>>,
}

impl<Okay> ResponseSink<Okay> {
    pub fn new(sender: crossbeam_channel::Sender<Result<Okay, ApiError>>) -> Self {
        Self {
            inner: Some(sender),
        }
    }

    /// Completes the response exactly once. Subsequent calls are no-ops
    /// in release builds and a debug assertion failure in test builds.
    pub fn complete(mut self, result: Result<Okay, ApiError>) {
        if let Some(sender) = self.inner.take() {
            let _ = sender.send(result);
        } else {
            debug_assert!(false, "ResponseSink completed twice");
        }
    }
}

impl<Okay> Drop for ResponseSink<Okay> {
    fn drop(&mut self) {
        if let Some(sender) = self.inner.take() {
            let _ = sender.send(Err(ApiError::new(
                ApiErrorKind::Internal,
                "response sink dropped without completing",
            )));
        }
    }
}

/// A command-with-callback: the decoded request plus the sink its
/// eventual response is written through. `C` identifies which command
/// this is, so a dispatcher can route on type rather than re-checking a
/// name string once past the registry.
pub struct Cwc<C: Command> {
    pub request: C::Request,
    sink: ResponseSink<C::Okay>,
    _marker: PhantomData<C>,
}

impl<C: Command> Cwc<C> {
    pub fn new(request: C::Request, sink: ResponseSink<C::Okay>) -> Self {
        Self {
            request,
            sink,
            _marker: PhantomData,
        }
    }

    pub fn respond(self, result: Result<C::Okay, ApiError>) {
        self.sink.complete(result);
    }

    pub fn reject_state_mismatch(self, current_state: &str) {
        self.respond(Err(ApiError::state_mismatch(current_state, C::NAME)));
    }
}

/// Converts a correlation-table cancellation (connection closed, timed
/// out) into the `ApiError` shape a waiting caller expects. Transport
/// failures never change the state machine (spec §4.3).
pub fn transport_error_as_api_error(err: TransportError) -> ApiError {
    ApiError::new(ApiErrorKind::Transport, err.to_string())
}
