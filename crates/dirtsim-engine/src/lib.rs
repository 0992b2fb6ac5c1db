//! # dirtsim-engine
//!
//! The Server's core: the event dispatcher, the `ServerState` state
//! machine, the evolutionary trainer, the genome and training-result
//! repositories, and the WebSocket transport that feeds them.

#![forbid(unsafe_code)]

pub mod brain;
pub mod commands;
pub mod config_io;
pub mod dispatcher;
pub mod errors;
pub mod events;
pub mod genome_repo;
pub mod ids;
pub mod prelude;
pub mod rng;
pub mod scenario;
pub mod settings;
pub mod state;
pub mod telemetry;
pub mod trainer;
pub mod training_repo;
pub mod transport;
pub mod world;
