//! # dirtsim-types::id
//!
//! Defines the core identifier types used throughout the control plane.
//! Using distinct types for different kinds of IDs helps prevent bugs where,
//! for example, a `GenomeId` might be accidentally used as a `TrainingSessionId`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a genome across sessions. A v4 UUID, canonical
/// dashed 36-character form on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenomeId(pub Uuid);

impl GenomeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GenomeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GenomeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identifier for one evolutionary run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrainingSessionId(pub Uuid);

impl TrainingSessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrainingSessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TrainingSessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one WebSocket connection, scoped to a single transport
/// instance (Server or UI). Used for per-connection correlation tables
/// and subscription bookkeeping.
pub type ConnectionId = u64;

/// Monotonic per-connection request id. `0` is reserved for unsolicited
/// broadcasts (`id = 0` never pairs a response to a request).
pub type RequestId = u64;
