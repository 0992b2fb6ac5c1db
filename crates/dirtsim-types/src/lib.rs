//! # dirtsim-types
//!
//! This crate provides the foundational, shared data types used across the
//! entire DirtSim workspace. Its purpose is to break dependency cycles by
//! providing a stable, central location for types that `dirtsim-engine`,
//! `dirtsim-proto`, `dirtsim-cli`, and `dirtsim-ui` all need to agree upon.

#![forbid(unsafe_code)]

pub mod config;
pub mod envelope;
pub mod errors;
pub mod genome;
pub mod id;
pub mod metrics;
pub mod scenario;
pub mod training;
