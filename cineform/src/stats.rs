// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! Session-scoped observability counters: the redesign of `original_source`'s
//! `counter.h` debug tick counters into optional, session-owned output rather than process-wide
//! globals. Not a codec feature a `Non-goal` could exclude — ambient observability is carried
//! regardless.

use std::sync::atomic::{AtomicU64, Ordering};

/// Running counters for one [`crate::Session`]'s lifetime.
#[derive(Default)]
pub struct SessionStats {
    samples_encoded: AtomicU64,
    samples_decoded: AtomicU64,
    bytes_written: AtomicU64,
    peaks_emitted: AtomicU64,
    fsm_cache_hits: AtomicU64,
    fsm_cache_misses: AtomicU64,
}

/// A point-in-time snapshot of [`SessionStats`], cheap to log or report without further atomic
/// loads.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub samples_encoded: u64,
    pub samples_decoded: u64,
    pub bytes_written: u64,
    pub peaks_emitted: u64,
    pub fsm_cache_hits: u64,
    pub fsm_cache_misses: u64,
}

impl SessionStats {
    pub fn new() -> Self {
        SessionStats::default()
    }

    pub(crate) fn record_encode(&self, bytes: usize, peaks: usize) {
        self.samples_encoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
        self.peaks_emitted.fetch_add(peaks as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_decode(&self) {
        self.samples_decoded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fsm_cache_hit(&self) {
        self.fsm_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fsm_cache_miss(&self) {
        self.fsm_cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            samples_encoded: self.samples_encoded.load(Ordering::Relaxed),
            samples_decoded: self.samples_decoded.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            peaks_emitted: self.peaks_emitted.load(Ordering::Relaxed),
            fsm_cache_hits: self.fsm_cache_hits.load(Ordering::Relaxed),
            fsm_cache_misses: self.fsm_cache_misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let stats = SessionStats::new();
        stats.record_encode(128, 2);
        stats.record_encode(64, 0);
        stats.record_decode();
        stats.record_fsm_cache_miss();
        stats.record_fsm_cache_hit();

        let snap = stats.snapshot();
        assert_eq!(snap.samples_encoded, 2);
        assert_eq!(snap.samples_decoded, 1);
        assert_eq!(snap.bytes_written, 192);
        assert_eq!(snap.peaks_emitted, 2);
        assert_eq!(snap.fsm_cache_hits, 1);
        assert_eq!(snap.fsm_cache_misses, 1);
    }
}
