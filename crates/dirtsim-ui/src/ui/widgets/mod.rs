//! # dirtsim-ui::ui::widgets
//!
//! This module contains the individual widget implementations for the dashboard.

pub mod genomes;
pub mod log;
pub mod status;
pub mod training;
