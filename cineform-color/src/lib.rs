// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! `cineform-color` implements the color converter: fixed-point RGB↔YUV
//! matrices, the alpha channel's nonlinear companding curve, Bayer mosaic quadrature unpacking,
//! the encoding-curve LUT family, and pack/unpack for every supported wire pixel format.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod alpha;
pub mod bayer;
pub mod curve;
pub mod format;
pub mod matrix;

pub use bayer::{BayerOrientation, MosaicQuad, Quadrature};
pub use curve::EncodingCurve;
pub use format::{pack, packed_size, unpack, Channel, PixelFormat};
pub use matrix::{ColorMatrix, Coefficients};
