// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! The prescale ladder: the six named right-shift knobs applied
//! at specific transform stages, grounded on `original_source/Codec/filter.h`'s
//! `_FRAME_PRESCALE`/`_TEMPORAL_PRESCALE`/`_SPATIAL_PRESCALE`/`_LOWPASS_PRESCALE`/
//! `_INVERSE_DESCALE`/`_INVERSE_MIDSCALE` `#define`s, which this crate keeps as named `const`
//! fields instead of free-floating magic numbers.

/// The six named prescale knobs, each a non-negative right-shift applied at one transform
/// stage. Every band records the sum of prescales baked into it in its `scale` field; the
/// inverse pipeline right-shifts by that sum before handing pixels to `cineform-color`.
#[derive(Copy, Clone, Debug)]
pub struct PrescaleLadder {
    /// Interlaced horizontal (frame) transform prescale. `filter.h`: `_FRAME_PRESCALE = 2`.
    pub frame: u8,
    /// Temporal (field) transform prescale. `filter.h`: `_TEMPORAL_PRESCALE = 0`.
    pub temporal: u8,
    /// Spatial transform prescale. `filter.h`: `_SPATIAL_PRESCALE = 0`.
    pub spatial: u8,
    /// Prescale applied to the temporal-LL band before the spatial transform runs on it, to avoid
    /// overflow. `filter.h`: `_LOWPASS_PRESCALE = 2`.
    pub lowpass: u8,
    /// Right-shift removed after the inverse transform completes. `filter.h`:
    /// `_INVERSE_DESCALE = 1`.
    pub inverse_descale: u8,
    /// Right-shift applied between inverse transform stages. `filter.h`: `_INVERSE_MIDSCALE = 0`.
    pub inverse_midscale: u8,
}

impl PrescaleLadder {
    /// The ladder CineForm ships with in normal (non-reversible-test) operation.
    pub const NORMAL: PrescaleLadder = PrescaleLadder {
        frame: 2,
        temporal: 0,
        spatial: 0,
        lowpass: 2,
        inverse_descale: 1,
        inverse_midscale: 0,
    };

    /// Every knob disabled: used by the reversible test mode.
    pub const REVERSIBLE: PrescaleLadder = PrescaleLadder {
        frame: 0,
        temporal: 0,
        spatial: 0,
        lowpass: 0,
        inverse_descale: 0,
        inverse_midscale: 0,
    };
}

impl Default for PrescaleLadder {
    fn default() -> Self {
        PrescaleLadder::NORMAL
    }
}

/// The forward-transform lowpass rounding bias, grounded on `filter.h`'s
/// `ROUNDING(x,y)` macro. The shipped encoder always adds a fixed `+4` bias regardless of the
/// prescale ladder in use (`filter.h`'s own comment: "ROUNDING(sum,8) should be just +4 thru 7");
/// the reversible test mode instead biases by half the divisor so the forward/inverse round trip
/// is bit-exact, with every prescale disabled and the encoder rounding bias set to `(sum/2)`.
#[derive(Copy, Clone, Debug)]
pub enum RoundingBias {
    /// `filter.h`'s shipped constant.
    Fixed(i32),
    /// `(divisor / 2)`, rounding toward positive infinity for the five-tap filter's implicit
    /// divisor of 8.
    Reversible,
}

impl RoundingBias {
    pub const NORMAL: RoundingBias = RoundingBias::Fixed(4);

    /// The bias to add before the five-tap lowpass filter's implicit `>> 3` (divide by 8).
    pub fn bias_for_divide_by_8(self) -> i32 {
        match self {
            RoundingBias::Fixed(bias) => bias,
            RoundingBias::Reversible => 4,
        }
    }
}

impl Default for RoundingBias {
    fn default() -> Self {
        RoundingBias::NORMAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_ladder_matches_filter_h_constants() {
        let ladder = PrescaleLadder::NORMAL;
        assert_eq!(ladder.frame, 2);
        assert_eq!(ladder.temporal, 0);
        assert_eq!(ladder.spatial, 0);
        assert_eq!(ladder.lowpass, 2);
        assert_eq!(ladder.inverse_descale, 1);
        assert_eq!(ladder.inverse_midscale, 0);
    }

    #[test]
    fn reversible_ladder_disables_every_knob() {
        let ladder = PrescaleLadder::REVERSIBLE;
        assert_eq!(ladder.frame, 0);
        assert_eq!(ladder.temporal, 0);
        assert_eq!(ladder.spatial, 0);
        assert_eq!(ladder.lowpass, 0);
        assert_eq!(ladder.inverse_descale, 0);
        assert_eq!(ladder.inverse_midscale, 0);
    }
}
