// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! The wavelet data model: a per-channel tree of transform levels, each
//! owning four bands. `cineform-wavelet` owns the transform math; this crate only owns the
//! shape: pointer-rich graphs become owned trees indexed by position rather than linked by
//! back-pointers — a level's LL band feeds the next level's input by index, not by reference.

use arrayvec::ArrayVec;

use crate::plane::PixelPlane;

/// Maximum transform levels per channel.
pub const MAX_LEVELS: usize = 3;

/// One of the four quadrants produced by a single 2-D wavelet level.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BandKind {
    /// Low-pass both dimensions; input to the next level.
    Ll,
    /// Low-pass horizontal, high-pass vertical.
    Lh,
    /// High-pass horizontal, low-pass vertical.
    Hl,
    /// High-pass both dimensions.
    Hh,
}

/// Whether a band's coefficients are stored/entropy-coded as signed or unsigned values. LL bands
/// (always nonnegative pixel energy) are unsigned; LH/HL/HH highpass bands are signed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StoragePolicy {
    Signed,
    Unsigned,
}

/// A run of consecutive zero coefficients discovered during encoding,
/// recorded so the entropy coder can emit a single run-length code instead of individual zeros.
#[derive(Copy, Clone, Debug)]
pub struct ZeroRun {
    pub offset: u32,
    pub count: u32,
}

/// One of the four outputs of a wavelet level.
pub struct Band<'a> {
    pub kind: BandKind,
    pub plane: PixelPlane<'a>,
    /// Quantization divisor. Always ≥ 1; LL bands carry `quantizer == 1`.
    pub quantizer: u16,
    pub storage: StoragePolicy,
    pub runs: Vec<ZeroRun>,
}

impl<'a> Band<'a> {
    pub fn new(kind: BandKind, plane: PixelPlane<'a>, quantizer: u16, storage: StoragePolicy) -> Self {
        debug_assert!(quantizer >= 1);
        debug_assert!(kind != BandKind::Ll || quantizer == 1);
        Band { kind, plane, quantizer, storage, runs: Vec::new() }
    }
}

/// One transform level: four bands, all at the same dimensions (half the previous level's LL).
pub struct Level<'a> {
    pub ll: Band<'a>,
    pub lh: Band<'a>,
    pub hl: Band<'a>,
    pub hh: Band<'a>,
}

/// A per-channel tree of up to [`MAX_LEVELS`] transform levels. `levels[0]`
/// is the finest level (largest bands, computed first during the forward transform); the LL band
/// of `levels[n]` is the input to `levels[n + 1]`.
pub struct Wavelet<'a> {
    pub levels: ArrayVec<Level<'a>, MAX_LEVELS>,
}

impl<'a> Wavelet<'a> {
    pub fn new() -> Self {
        Wavelet { levels: ArrayVec::new() }
    }

    /// The coarsest level's LL band: the final lowpass-lowpass residual, the "input to level
    /// n+1" terminated at the top of the tree.
    pub fn root_ll(&self) -> Option<&Band<'a>> {
        self.levels.last().map(|level| &level.ll)
    }
}

impl<'a> Default for Wavelet<'a> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::plane::{PixelPlane, SampleKind};

    #[test]
    fn ll_band_accepts_unit_quantizer() {
        let mut arena = Arena::new(4096);
        let mut root = arena.root();
        let plane = PixelPlane::alloc(&mut root, 4, 4, SampleKind::Signed16).unwrap();
        let band = Band::new(BandKind::Ll, plane, 1, StoragePolicy::Unsigned);
        assert_eq!(band.quantizer, 1);
    }

    #[test]
    #[should_panic]
    fn ll_band_rejects_non_unit_quantizer() {
        let mut arena = Arena::new(4096);
        let mut root = arena.root();
        let plane = PixelPlane::alloc(&mut root, 4, 4, SampleKind::Signed16).unwrap();
        Band::new(BandKind::Ll, plane, 2, StoragePolicy::Unsigned);
    }

    #[test]
    fn root_ll_is_coarsest_level() {
        let wavelet: Wavelet = Wavelet::new();
        assert!(wavelet.root_ll().is_none());
    }
}
