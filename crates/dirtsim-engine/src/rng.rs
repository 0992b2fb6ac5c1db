//! # dirtsim-engine::rng
//!
//! The trainer's master RNG discipline: every draw (tournament sampling,
//! mutation, random genome creation) goes through `RngDiscipline` so the
//! count of draws per site is auditable and a training run seeded the
//! same way reproduces bit-for-bit.

use rand::RngCore;
use rand_chacha::ChaCha20Rng;
use std::collections::BTreeMap;

pub struct RngDiscipline<'a> {
    rng: &'a mut ChaCha20Rng,
    recorder: &'a mut Recorder,
    site_label: &'static str,
}

impl<'a> RngDiscipline<'a> {
    pub fn new(rng: &'a mut ChaCha20Rng, recorder: &'a mut Recorder, site_label: &'static str) -> Self {
        Self {
            rng,
            recorder,
            site_label,
        }
    }
}

impl RngCore for RngDiscipline<'_> {
    fn next_u32(&mut self) -> u32 {
        self.recorder.record_draw(self.site_label);
        self.rng.next_u32()
    }
    fn next_u64(&mut self) -> u64 {
        self.recorder.record_draw(self.site_label);
        self.rng.next_u64()
    }
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.recorder.record_draw(self.site_label);
        self.rng.fill_bytes(dest)
    }
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.recorder.record_draw(self.site_label);
        self.rng.try_fill_bytes(dest)
    }
}

/// Counts RNG draws per call site across a training run, surfaced via
/// `TimerStatsGet`/`PerfStatsGet`-style introspection commands.
#[derive(Default)]
pub struct Recorder {
    sites: BTreeMap<&'static str, u64>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_draw(&mut self, site_label: &'static str) {
        *self.sites.entry(site_label).or_insert(0) += 1;
    }

    pub fn draws_at(&self, site_label: &str) -> u64 {
        self.sites.get(site_label).copied().unwrap_or(0)
    }
}
