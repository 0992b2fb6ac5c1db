//! # dirtsim-engine::ids
//!
//! A generator for the engine's internal monotonic counters: per-process
//! connection ids and the insertion sequence the event queue uses to
//! break same-tick ties deterministically.

use dirtsim_types::id::ConnectionId;

#[derive(Default)]
pub struct IdGen {
    next_connection_id: ConnectionId,
    next_insertion_seq: u64,
}

impl IdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_connection_id(&mut self) -> ConnectionId {
        let id = self.next_connection_id;
        self.next_connection_id = self
            .next_connection_id
            .checked_add(1)
            .expect("ConnectionId overflow");
        id
    }

    pub fn next_insertion_seq(&mut self) -> u64 {
        let seq = self.next_insertion_seq;
        self.next_insertion_seq = self
            .next_insertion_seq
            .checked_add(1)
            .expect("insertion sequence overflow");
        seq
    }
}
