// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! The 2-D wavelet level transform: horizontal pass, then
//! vertical pass, of the 1-D lift (`lift.rs`), and the per-channel multi-level tree built from it.
//!
//! Operates on plain row-major `Grid`s rather than `cineform-core`'s arena-owned `PixelPlane`
//! directly, so the transform math is testable in isolation; `cineform::encode`/`decode` (C9) are
//! the ones that copy plane data into and out of these grids against the session scratch arena
//! (see `DESIGN.md`).

use crate::lift::{forward_1d, inverse_1d};
use crate::prescale::PrescaleLadder;

/// A plain row-major grid of 32-bit working coefficients.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    data: Vec<i32>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Grid { width, height, data: vec![0; width * height] }
    }

    pub fn from_rows(rows: Vec<Vec<i32>>) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(width * height);
        for row in rows {
            debug_assert_eq!(row.len(), width);
            data.extend(row);
        }
        Grid { width, height, data }
    }

    pub fn row(&self, y: usize) -> &[i32] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [i32] {
        &mut self.data[y * self.width..(y + 1) * self.width]
    }

    pub fn column(&self, x: usize) -> Vec<i32> {
        (0..self.height).map(|y| self.data[y * self.width + x]).collect()
    }

    pub fn set_column(&mut self, x: usize, values: &[i32]) {
        debug_assert_eq!(values.len(), self.height);
        for (y, &v) in values.iter().enumerate() {
            self.data[y * self.width + x] = v;
        }
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.data
    }
}

/// The four bands a single 2-D level produces.
#[derive(Clone, Debug)]
pub struct LevelBands {
    pub ll: Grid,
    pub lh: Grid,
    pub hl: Grid,
    pub hh: Grid,
    /// Prescale right-shifts baked into `lh`/`hl`/`hh` by this level.
    pub highpass_scale: u8,
}

#[inline]
fn apply_shift(value: i32, shift: u8) -> i32 {
    if shift == 0 { value } else { value >> shift }
}

#[inline]
fn undo_shift(value: i32, shift: u8) -> i32 {
    if shift == 0 { value } else { value << shift }
}

/// Applies the horizontal lift to every row, then the vertical lift to every column of each
/// horizontal output, producing the level's four bands.
///
/// `highpass_scale` is an additional right-shift applied to every highpass-containing band after
/// the lift (`LH`, `HL`, `HH`) — the prescale headroom reduction applied at specific transform
/// stages. It is lossy whenever nonzero; `0` makes this level exactly invertible by `inverse_level`.
pub fn forward_level(input: &Grid, rounding_bias: i32, highpass_scale: u8) -> LevelBands {
    let half_width = input.width.div_ceil(2);
    let mut horiz_low = Grid::new(half_width, input.height);
    let mut horiz_high = Grid::new(input.width / 2, input.height);

    for y in 0..input.height {
        let (low, high) = forward_1d(input.row(y), rounding_bias);
        horiz_low.row_mut(y).copy_from_slice(&low);
        horiz_high.row_mut(y).copy_from_slice(&high);
    }

    let half_height = input.height.div_ceil(2);
    let mut ll = Grid::new(half_width, half_height);
    let mut lh = Grid::new(half_width, input.height / 2);
    for x in 0..half_width {
        let (low, high) = forward_1d(&horiz_low.column(x), rounding_bias);
        ll.set_column(x, &low);
        let shifted: Vec<i32> = high.iter().map(|&v| apply_shift(v, highpass_scale)).collect();
        lh.set_column(x, &shifted);
    }

    let mut hl = Grid::new(horiz_high.width, half_height);
    let mut hh = Grid::new(horiz_high.width, input.height / 2);
    for x in 0..horiz_high.width {
        let (low, high) = forward_1d(&horiz_high.column(x), rounding_bias);
        let low_shifted: Vec<i32> = low.iter().map(|&v| apply_shift(v, highpass_scale)).collect();
        hl.set_column(x, &low_shifted);
        let high_shifted: Vec<i32> = high.iter().map(|&v| apply_shift(v, highpass_scale)).collect();
        hh.set_column(x, &high_shifted);
    }

    LevelBands { ll, lh, hl, hh, highpass_scale }
}

/// Inverts [`forward_level`], reconstructing a grid of `(width, height)`.
pub fn inverse_level(bands: &LevelBands, width: usize, height: usize, rounding_bias: i32) -> Grid {
    let half_width = width.div_ceil(2);
    let half_height = height.div_ceil(2);
    debug_assert_eq!(bands.ll.width, half_width);
    debug_assert_eq!(bands.ll.height, half_height);

    let mut horiz_low = Grid::new(half_width, height);
    for x in 0..half_width {
        let ll_col = bands.ll.column(x);
        let lh_col: Vec<i32> = bands.lh.column(x).iter().map(|&v| undo_shift(v, bands.highpass_scale)).collect();
        let restored = inverse_1d(&ll_col, &lh_col, height, rounding_bias);
        horiz_low.set_column(x, &restored);
    }

    let horiz_high_width = width / 2;
    let mut horiz_high = Grid::new(horiz_high_width, height);
    for x in 0..horiz_high_width {
        let hl_col: Vec<i32> = bands.hl.column(x).iter().map(|&v| undo_shift(v, bands.highpass_scale)).collect();
        let hh_col: Vec<i32> = bands.hh.column(x).iter().map(|&v| undo_shift(v, bands.highpass_scale)).collect();
        let restored = inverse_1d(&hl_col, &hh_col, height, rounding_bias);
        horiz_high.set_column(x, &restored);
    }

    let mut out = Grid::new(width, height);
    for y in 0..height {
        let restored = inverse_1d(horiz_low.row(y), horiz_high.row(y), width, rounding_bias);
        out.row_mut(y).copy_from_slice(&restored);
    }

    out
}

/// How a channel's multi-level tree is organized.
#[derive(Copy, Clone, Debug)]
pub enum Organization {
    /// Progressive content: `levels` spatial transforms, each operating
    /// on the previous level's LL.
    Progressive { levels: u8 },
    /// Interlaced content: one field-temporal transform (even/odd rows), then `spatial_levels`
    /// spatial transforms on the temporal-lowpass band, and one spatial transform on the
    /// temporal-highpass band.
    Interlaced { spatial_levels: u8 },
}

/// A built multi-level wavelet tree's per-level bands, finest level first.
pub struct WaveletLevels {
    pub levels: Vec<LevelBands>,
}

/// Runs the forward transform ladder for one channel plane.
pub fn forward_wavelet(input: &Grid, organization: Organization, ladder: &PrescaleLadder, rounding_bias: i32) -> WaveletLevels {
    match organization {
        Organization::Progressive { levels } => {
            let mut out = Vec::with_capacity(levels as usize);
            let mut current = input.clone();
            for _ in 0..levels {
                let level = forward_level(&current, rounding_bias, ladder.spatial);
                current = level.ll.clone();
                out.push(level);
            }
            WaveletLevels { levels: out }
        }
        Organization::Interlaced { spatial_levels } => {
            let temporal = forward_level(input, rounding_bias, ladder.frame.max(ladder.temporal));
            let mut out = Vec::with_capacity(1 + spatial_levels as usize);

            let mut current = temporal.ll.clone();
            for i in 0..spatial_levels {
                let shift = if i == 0 { ladder.lowpass } else { ladder.spatial };
                let level = forward_level(&current, rounding_bias, shift);
                current = level.ll.clone();
                out.push(level);
            }

            let hh_level = forward_level(&temporal.lh, rounding_bias, ladder.spatial);
            out.push(hh_level);
            WaveletLevels { levels: out }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn random_grid(rng: &mut SmallRng, width: usize, height: usize) -> Grid {
        let mut g = Grid::new(width, height);
        for v in g.data.iter_mut() {
            *v = rng.random_range(-1000..1000);
        }
        g
    }

    #[test]
    fn level_round_trips_with_zero_prescale() {
        let mut rng = SmallRng::seed_from_u64(7);
        let grid = random_grid(&mut rng, 16, 12);
        let bands = forward_level(&grid, 4, 0);
        let back = inverse_level(&bands, grid.width, grid.height, 4);
        assert_eq!(back, grid);
    }

    #[test]
    fn level_round_trips_odd_dimensions() {
        let mut rng = SmallRng::seed_from_u64(11);
        let grid = random_grid(&mut rng, 17, 9);
        let bands = forward_level(&grid, 4, 0);
        let back = inverse_level(&bands, grid.width, grid.height, 4);
        assert_eq!(back, grid);
    }

    #[test]
    fn two_level_progressive_tree_has_expected_shapes() {
        let mut rng = SmallRng::seed_from_u64(3);
        let grid = random_grid(&mut rng, 64, 32);
        let tree = forward_wavelet(&grid, Organization::Progressive { levels: 2 }, &PrescaleLadder::REVERSIBLE, 4);
        assert_eq!(tree.levels.len(), 2);
        assert_eq!(tree.levels[0].ll.width, 32);
        assert_eq!(tree.levels[0].ll.height, 16);
        assert_eq!(tree.levels[1].ll.width, 16);
        assert_eq!(tree.levels[1].ll.height, 8);
    }
}
