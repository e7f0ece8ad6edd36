// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! `cineform-wavelet` implements the reversible wavelet transform and the
//! divide-by-`Q` half of the quantizer.
//!
//! The transform itself (`lift`, `transform`) works on plain owned `Grid`s, independent of
//! `cineform-core`'s arena and bitstream types; `cineform`'s session orchestrator (C9) is what
//! copies `PixelPlane` data into a `Grid`, runs the ladder, and copies the resulting bands back
//! into arena-owned planes for `cineform-container` to frame and `cineform-entropy` to encode.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod lift;
pub mod prescale;
pub mod quantize;
pub mod transform;

pub use prescale::{PrescaleLadder, RoundingBias};
pub use transform::{forward_level, forward_wavelet, inverse_level, Grid, LevelBands, Organization, WaveletLevels};
