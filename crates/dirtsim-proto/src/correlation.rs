//! # dirtsim-proto::correlation
//!
//! Per-connection `id -> pending response` table (spec §3 "Correlation
//! table", §5 "Shared resources"). Owned and mutated only by the
//! transport thread that issued the requests; on timeout or connection
//! close every pending entry is completed with a `TransportError` rather
//! than left to hang.

use dirtsim_types::errors::TransportError;
use dirtsim_types::id::RequestId;
use indexmap::IndexMap;
use std::time::{Duration, Instant};

struct Pending {
    sender: crossbeam_channel::Sender<Result<bytes::Bytes, TransportError>>,
    deadline: Instant,
}

/// Tracks outbound requests awaiting a response on one connection.
/// `id = 0` is never installed here — it's reserved for broadcasts
/// (spec §3).
pub struct CorrelationTable {
    next_id: RequestId,
    pending: IndexMap<RequestId, Pending>,
    default_timeout: Duration,
}

impl CorrelationTable {
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            next_id: 1,
            pending: IndexMap::new(),
            default_timeout,
        }
    }

    /// Allocates the next id and installs a pending entry for it,
    /// returning a receiver the caller awaits (or times out on).
    pub fn begin(
        &mut self,
        timeout: Option<Duration>,
    ) -> (
        RequestId,
        crossbeam_channel::Receiver<Result<bytes::Bytes, TransportError>>,
    ) {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        let (sender, receiver) = crossbeam_channel::bounded(1);
        let deadline = Instant::now() + timeout.unwrap_or(self.default_timeout);
        self.pending.insert(id, Pending { sender, deadline });
        (id, receiver)
    }

    /// Completes a pending request with a successful payload. A response
    /// for an id that isn't pending (already timed out, or spurious) is
    /// dropped with no effect.
    pub fn complete(&mut self, id: RequestId, payload: bytes::Bytes) {
        if let Some(entry) = self.pending.shift_remove(&id) {
            let _ = entry.sender.send(Ok(payload));
        }
    }

    /// Cancels every pending entry with `reason`, e.g. on connection
    /// close (spec §5 "Cancellation and timeouts").
    pub fn cancel_all(&mut self, reason: TransportError) {
        for (_, entry) in self.pending.drain(..) {
            let _ = entry.sender.send(Err(reason.clone()));
        }
    }

    /// Removes and completes (with `Timeout`) every entry whose deadline
    /// has passed. Called periodically by the transport's poll loop.
    pub fn sweep_expired(&mut self) {
        let now = Instant::now();
        let expired: Vec<RequestId> = self
            .pending
            .iter()
            .filter(|(_, e)| e.deadline <= now)
            .map(|(id, _)| *id)
            .collect();
        for id in expired {
            if let Some(entry) = self.pending.shift_remove(&id) {
                let _ = entry.sender.send(Err(TransportError::Timeout));
            }
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_delivers_payload() {
        let mut table = CorrelationTable::new(Duration::from_secs(5));
        let (id, rx) = table.begin(None);
        table.complete(id, bytes::Bytes::from_static(b"ok"));
        assert_eq!(rx.recv().unwrap().unwrap(), bytes::Bytes::from_static(b"ok"));
    }

    #[test]
    fn cancel_all_resolves_every_pending_entry() {
        let mut table = CorrelationTable::new(Duration::from_secs(5));
        let (_id1, rx1) = table.begin(None);
        let (_id2, rx2) = table.begin(None);
        assert_eq!(table.pending_count(), 2);
        table.cancel_all(TransportError::Closed);
        assert!(matches!(rx1.recv().unwrap(), Err(TransportError::Closed)));
        assert!(matches!(rx2.recv().unwrap(), Err(TransportError::Closed)));
        assert_eq!(table.pending_count(), 0);
    }

    #[test]
    fn sweep_expired_times_out_stale_entries() {
        let mut table = CorrelationTable::new(Duration::from_millis(1));
        let (_id, rx) = table.begin(None);
        std::thread::sleep(Duration::from_millis(5));
        table.sweep_expired();
        assert!(matches!(rx.recv().unwrap(), Err(TransportError::Timeout)));
    }

    #[test]
    fn unknown_id_complete_is_a_no_op() {
        let mut table = CorrelationTable::new(Duration::from_secs(5));
        table.complete(999, bytes::Bytes::new());
        assert_eq!(table.pending_count(), 0);
    }
}
