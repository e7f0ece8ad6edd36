// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! Session configuration.

/// A capability-interface placeholder: processor dispatch is hidden behind this enum so a
/// vectorized profile can be added later without touching the public API.
/// Hand-written SIMD kernels are explicitly out of this crate's contract, so the
/// only variant implemented today is the portable scalar path.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum SimdProfile {
    #[default]
    Scalar,
}

/// Knobs collected from what would otherwise be conditional compilation:
/// allocator sizing, thread limit, affinity, and instruction-set dispatch.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Upper bound on worker pool size; `None` means `cpu_count`. Mirrors the metadata database's `CPU-limit` field, but this is
    /// the session-construction-time default, not a per-sample override.
    thread_limit: Option<usize>,
    /// Reserved for a future affinity-aware scheduler; not consulted by the portable scalar
    /// worker pool today.
    affinity_mask: Option<u64>,
    simd_profile: SimdProfile,
    /// When set, quantizer divisors are forced to `1` and the prescale ladder is disabled
    /// entirely.
    lossless: bool,
    /// Bytes provisioned for the per-sample scratch arena. The default is sized
    /// for the widest band a 4K 4:4:4 frame would need plus SIMD alignment slack; callers
    /// encoding larger frames should provision more via [`SessionConfig::with_scratch_bytes`].
    scratch_bytes: usize,
}

/// Default scratch arena size: enough for a handful of full-resolution working planes of a
/// 4096x2160 frame at 16-bit sample width, with headroom for alignment padding.
const DEFAULT_SCRATCH_BYTES: usize = 64 * 1024 * 1024;

impl SessionConfig {
    pub fn new() -> Self {
        SessionConfig::default()
    }

    pub fn with_thread_limit(mut self, limit: usize) -> Self {
        self.thread_limit = Some(limit);
        self
    }

    pub fn with_affinity_mask(mut self, mask: u64) -> Self {
        self.affinity_mask = Some(mask);
        self
    }

    pub fn with_simd_profile(mut self, profile: SimdProfile) -> Self {
        self.simd_profile = profile;
        self
    }

    pub fn with_lossless(mut self, lossless: bool) -> Self {
        self.lossless = lossless;
        self
    }

    pub fn with_scratch_bytes(mut self, bytes: usize) -> Self {
        self.scratch_bytes = bytes;
        self
    }

    pub fn lossless(&self) -> bool {
        self.lossless
    }

    pub fn scratch_bytes(&self) -> usize {
        self.scratch_bytes
    }

    pub fn simd_profile(&self) -> SimdProfile {
        self.simd_profile
    }

    pub fn affinity_mask(&self) -> Option<u64> {
        self.affinity_mask
    }

    /// Resolves the configured thread limit against the host's CPU count:
    /// `min(cpu_count, CPU_LIMIT)`.
    pub fn resolved_thread_count(&self) -> usize {
        let cpus = std::thread::available_parallelism().map_or(1, |n| n.get());
        self.thread_limit.map_or(cpus, |limit| limit.min(cpus)).max(1)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            thread_limit: None,
            affinity_mask: None,
            simd_profile: SimdProfile::default(),
            lossless: false,
            scratch_bytes: DEFAULT_SCRATCH_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thread_limit_does_not_exceed_host_cpus() {
        let config = SessionConfig::new();
        let cpus = std::thread::available_parallelism().map_or(1, |n| n.get());
        assert!(config.resolved_thread_count() <= cpus);
        assert!(config.resolved_thread_count() >= 1);
    }

    #[test]
    fn explicit_thread_limit_is_capped_by_host_cpus() {
        let config = SessionConfig::new().with_thread_limit(1_000_000);
        let cpus = std::thread::available_parallelism().map_or(1, |n| n.get());
        assert_eq!(config.resolved_thread_count(), cpus);
    }

    #[test]
    fn lossless_defaults_to_off() {
        assert!(!SessionConfig::new().lossless());
        assert!(SessionConfig::new().with_lossless(true).lossless());
    }
}
