//! # dirtsim-modelcheck
//!
//! Has no runtime surface of its own -- it exists to hold `proptest`
//! property tests over the data laws the other crates define (envelope
//! round-trips, selection/elitism invariants, genome repository
//! bookkeeping) and `loom` exhaustive-interleaving tests over the
//! concurrency primitives (exactly-once response delivery, access
//! control under concurrent readers/writers). See `tests/`.
