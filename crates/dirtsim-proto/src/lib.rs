//! # dirtsim-proto
//!
//! The typed RPC fabric shared by the Server and UI: the envelope codec
//! (binary and JSON), the command registry, the command-with-callback
//! (CWC) carrier, and the per-connection correlation table (spec §4.1,
//! §4.2, §4.3).

#![forbid(unsafe_code)]

pub mod api;
pub mod codec;
pub mod correlation;
pub mod ctx_ext;

pub use api::{Command, CommandRegistry, HandlerShape};
pub use ctx_ext::{ResponseSink, Cwc};
