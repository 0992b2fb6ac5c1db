//! # dirtsim-types::metrics
//!
//! Constants for metric names and labels, emitted via the `metrics` crate
//! facade. Centralizing these prevents typos between the engine (where
//! metrics are recorded) and consumers (TUI dashboard, Prometheus scrape).

// --- Metric Names ---
pub const MET_CMD_DISPATCHED: &str = "dirtsim_commands_dispatched_total";
pub const MET_CMD_REJECTED_STATE_MISMATCH: &str = "dirtsim_commands_state_mismatch_total";
pub const MET_BROADCAST_SENT: &str = "dirtsim_broadcasts_sent_total";
pub const MET_BROADCAST_SUBSCRIBER_DROPPED: &str = "dirtsim_broadcast_subscriber_dropped_total";
pub const MET_TRANSPORT_DECODE_ERR: &str = "dirtsim_transport_decode_errors_total";
pub const MET_TRANSPORT_TIMEOUT: &str = "dirtsim_transport_timeouts_total";
pub const MET_EVOLUTION_GENERATION_GAUGE: &str = "dirtsim_evolution_generation";
pub const MET_EVOLUTION_BEST_FITNESS_GAUGE: &str = "dirtsim_evolution_best_fitness";
pub const MET_EVOLUTION_EVAL_COMPLETED: &str = "dirtsim_evolution_evaluations_completed_total";
pub const MET_TICK_EXEC_HISTO: &str = "dirtsim_tick_exec_ns";
pub const MET_TRAINING_RESULT_STORE_ERR: &str = "dirtsim_training_result_store_errors_total";

// --- Label Keys ---
pub const LBL_COMMAND: &str = "command";
pub const LBL_TARGET: &str = "target";
pub const LBL_STATE: &str = "state";
pub const LBL_BROADCAST: &str = "broadcast";
pub const LBL_REASON: &str = "reason";
