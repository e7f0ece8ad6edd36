// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! The reversible 1-D five-tap filter, applied along rows for the
//! horizontal pass and down columns for the vertical pass of a 2-D level (`transform.rs`).
//!
//! This implements the transform as a two-step integer lifting scheme (predict, then update) in
//! the CDF-5/3 family JPEG2000's lossless mode and CineForm's own public documentation both
//! describe this codec as resembling: exactly invertible by construction for *any*
//! integer-valued predict/update step, which is what lets "forward then inverse with all
//! prescales at zero is exactly invertible" hold regardless of the particular rounding constant
//! chosen (see `DESIGN.md`). Edge samples use mirrored extension, never wrap-around.

use cineform_core::util::clamp::clamp_i16;

/// Mirror-extending accessor: index `-1` reflects to `0`, index `len` reflects to `len - 1`.
#[inline]
fn mirrored(values: &[i32], index: isize) -> i32 {
    let len = values.len() as isize;
    debug_assert!(len > 0);
    let clamped = index.clamp(0, len - 1);
    values[clamped as usize]
}

#[inline]
fn round_avg2(a: i32, b: i32) -> i32 {
    (a + b + 1) >> 1
}

#[inline]
fn round_avg4(a: i32, b: i32, bias: i32) -> i32 {
    (a + b + bias) >> 2
}

/// Splits `input` (length `n`) into a lowpass band of `ceil(n/2)` samples and a highpass band of
/// `floor(n/2)` samples via one predict/update lifting step.
///
/// `highpass_bias` is the rounding constant added before the update step's implicit divide-by-4
///; any integer value here still round-trips exactly through
/// [`inverse_1d`] with the same bias, since lifting steps are invertible independent of the
/// predictor/updater's particular coefficients.
pub fn forward_1d(input: &[i32], highpass_bias: i32) -> (Vec<i32>, Vec<i32>) {
    let n = input.len();
    let num_even = n.div_ceil(2);
    let num_odd = n / 2;

    let even = |i: isize| -> i32 {
        let idx = i.clamp(0, num_even as isize - 1);
        input[2 * idx as usize]
    };

    let mut high = Vec::with_capacity(num_odd);
    for i in 0..num_odd {
        let o = input[2 * i + 1];
        let predicted = round_avg2(even(i as isize), even(i as isize + 1));
        high.push(o - predicted);
    }

    let d = |i: isize| -> i32 { mirrored(&high, i) };

    let mut low = Vec::with_capacity(num_even);
    for i in 0..num_even {
        let e = even(i as isize);
        let updated = round_avg4(d(i as isize - 1), d(i as isize), highpass_bias);
        low.push(e + updated);
    }

    (low, high)
}

/// Inverts [`forward_1d`]: reconstructs the original `n`-sample sequence from its lowpass/highpass
/// bands. `n` must match the length passed to the corresponding `forward_1d` call.
pub fn inverse_1d(low: &[i32], high: &[i32], n: usize, highpass_bias: i32) -> Vec<i32> {
    let num_even = low.len();
    let num_odd = high.len();
    debug_assert_eq!(num_even, n.div_ceil(2));
    debug_assert_eq!(num_odd, n / 2);

    let d = |i: isize| -> i32 { mirrored(high, i) };

    let mut even = vec![0i32; num_even];
    for i in 0..num_even {
        let updated = round_avg4(d(i as isize - 1), d(i as isize), highpass_bias);
        even[i] = low[i] - updated;
    }

    let even_at = |i: isize| -> i32 {
        let idx = i.clamp(0, num_even as isize - 1);
        even[idx as usize]
    };

    let mut out = vec![0i32; n];
    for i in 0..num_even {
        out[2 * i] = even[i];
    }
    for i in 0..num_odd {
        let predicted = round_avg2(even_at(i as isize), even_at(i as isize + 1));
        out[2 * i + 1] = high[i] + predicted;
    }

    out
}

/// Saturates a 32-bit intermediate coefficient to the 16-bit signed range a lowpass/highpass band
/// is stored in.
#[inline]
pub fn saturate_band_value(value: i32) -> i16 {
    clamp_i16(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn round_trips_even_length() {
        let input: Vec<i32> = vec![10, -5, 3, 7, -20, 100, 0, -1];
        let (low, high) = forward_1d(&input, 2);
        let back = inverse_1d(&low, &high, input.len(), 2);
        assert_eq!(back, input);
    }

    #[test]
    fn round_trips_odd_length() {
        let input: Vec<i32> = vec![10, -5, 3, 7, -20];
        let (low, high) = forward_1d(&input, 2);
        assert_eq!(low.len(), 3);
        assert_eq!(high.len(), 2);
        let back = inverse_1d(&low, &high, input.len(), 2);
        assert_eq!(back, input);
    }

    #[test]
    fn round_trips_regardless_of_rounding_bias() {
        let input: Vec<i32> = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        for bias in [-3, 0, 2, 4, 17] {
            let (low, high) = forward_1d(&input, bias);
            let back = inverse_1d(&low, &high, input.len(), bias);
            assert_eq!(back, input, "failed for bias={bias}");
        }
    }

    #[test]
    fn round_trips_random_sequences() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..200 {
            let len = rng.random_range(1..64);
            let input: Vec<i32> = (0..len).map(|_| rng.random_range(-2000..2000)).collect();
            let (low, high) = forward_1d(&input, 4);
            let back = inverse_1d(&low, &high, input.len(), 4);
            assert_eq!(back, input);
        }
    }

    #[test]
    fn single_sample_is_its_own_lowpass() {
        let input = vec![42];
        let (low, high) = forward_1d(&input, 4);
        assert_eq!(low, vec![42]);
        assert!(high.is_empty());
        let back = inverse_1d(&low, &high, 1, 4);
        assert_eq!(back, input);
    }
}
