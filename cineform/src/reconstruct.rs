// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! The inverse wavelet ladder shared by encode and decode.
//!
//! `cineform-wavelet::forward_wavelet` builds a whole `Progressive` tree in one call but the
//! crate exports no matching `inverse_wavelet` — only the single-level `inverse_level`. This module is that missing ladder, walked top-down from the coarsest level's
//! LL to level 0, shared by [`crate::encode`] (to build the reference a difference frame diffs
//! against) and [`crate::decode`] (to reconstruct a received sample): the entropy codec round-trips
//! exactly (`cineform_entropy`'s own tests confirm compand/expand and the FSM are lossless), so the
//! only lossy step in either direction is the quantizer, which is why the encoder can simulate the
//! decoder's reconstruction by quantizing-then-dequantizing in place rather than re-parsing a
//! bitstream it just wrote.

use cineform_wavelet::lift::saturate_band_value;
use cineform_wavelet::quantize::{dequantize, quantize};
use cineform_wavelet::transform::{inverse_level, Grid, LevelBands};

/// LL bands always carry `Q=1`.
pub(crate) const LOSSLESS_QUANTIZER: u16 = 1;

/// The flat highpass quantizer used outside lossless mode. No rate-control/quantizer-selection
/// algorithm is prescribed, so every highpass band in a non-lossless session gets this same
/// divisor (see `DESIGN.md`).
pub(crate) const DEFAULT_HIGHPASS_QUANTIZER: u16 = 8;

/// Progressive levels per channel.
pub(crate) const DEFAULT_LEVELS: u8 = 2;

/// Each level's own (pre-transform) working size, finest first, derived purely from the
/// channel's own dimensions and the level count — the same `ceil(n/2)` recurrence
/// `forward_level` halves by, so the decoder needs nothing more than `CHANNEL_SIZE` and
/// `SampleHeader::level_count` to know every level's shape before a single band header arrives.
pub(crate) fn level_dims(width: usize, height: usize, levels: u8) -> Vec<(usize, usize)> {
    let mut dims = Vec::with_capacity(levels as usize);
    let mut w = width;
    let mut h = height;
    for _ in 0..levels {
        dims.push((w, h));
        w = w.div_ceil(2);
        h = h.div_ceil(2);
    }
    dims
}

/// Quantizes then immediately dequantizes every value of `grid`, simulating the lossy rounding a
/// decoder will see without actually serializing through the entropy coder.
pub(crate) fn requantize_grid(grid: &Grid, q: u16) -> Grid {
    let mut out = Grid::new(grid.width, grid.height);
    for y in 0..grid.height {
        let src = grid.row(y);
        let dst = out.row_mut(y);
        for x in 0..grid.width {
            dst[x] = dequantize(quantize(src[x], q), q);
        }
    }
    out
}

/// Walks from the coarsest level's bands down to level 0, inverting one level at a time. `levels` is ordered finest-first, matching
/// [`cineform_wavelet::transform::WaveletLevels::levels`]; `dims[i]` is level `i`'s own
/// pre-transform `(width, height)`, from [`level_dims`].
pub(crate) fn invert_tree(levels: &[LevelBands], dims: &[(usize, usize)], rounding_bias: i32) -> Grid {
    let root = levels.len() - 1;
    let mut current = inverse_level(&levels[root], dims[root].0, dims[root].1, rounding_bias);

    for i in (0..root).rev() {
        let bands = LevelBands {
            ll: current,
            lh: levels[i].lh.clone(),
            hl: levels[i].hl.clone(),
            hh: levels[i].hh.clone(),
            highpass_scale: levels[i].highpass_scale,
        };
        current = inverse_level(&bands, dims[i].0, dims[i].1, rounding_bias);
    }

    current
}

/// Builds a row-major working grid from a channel's `i16` plane.
pub(crate) fn grid_from_channel_data(data: &[i16], width: usize, height: usize) -> Grid {
    let mut grid = Grid::new(width, height);
    for y in 0..height {
        let row = grid.row_mut(y);
        for x in 0..width {
            row[x] = i32::from(data[y * width + x]);
        }
    }
    grid
}

/// Saturates a reconstructed working grid back down to the channel's `i16` storage.
pub(crate) fn channel_data_from_grid(grid: &Grid) -> Vec<i16> {
    grid.as_slice().iter().map(|&v| saturate_band_value(v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cineform_wavelet::prescale::PrescaleLadder;
    use cineform_wavelet::transform::{forward_wavelet, Organization};

    #[test]
    fn level_dims_halves_with_ceiling_rounding() {
        let dims = level_dims(17, 9, 2);
        assert_eq!(dims, vec![(17, 9), (9, 5)]);
    }

    #[test]
    fn lossless_round_trip_through_the_whole_ladder() {
        let grid = grid_from_channel_data(&[10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120, 130, 140, 150, 160], 4, 4);
        let tree = forward_wavelet(&grid, Organization::Progressive { levels: 2 }, &PrescaleLadder::REVERSIBLE, 4);
        let dims = level_dims(4, 4, 2);

        let requantized: Vec<LevelBands> = tree
            .levels
            .iter()
            .map(|level| LevelBands {
                ll: requantize_grid(&level.ll, LOSSLESS_QUANTIZER),
                lh: requantize_grid(&level.lh, LOSSLESS_QUANTIZER),
                hl: requantize_grid(&level.hl, LOSSLESS_QUANTIZER),
                hh: requantize_grid(&level.hh, LOSSLESS_QUANTIZER),
                highpass_scale: level.highpass_scale,
            })
            .collect();

        let reconstructed = invert_tree(&requantized, &dims, 4);
        assert_eq!(reconstructed, grid);
    }
}
