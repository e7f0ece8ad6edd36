// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! `cineform-core` provides the data model, bit-level I/O, scratch allocator, and error type
//! shared by every other crate in the workspace: the pixel plane / frame / wavelet tree that
//! `cineform-wavelet`, `cineform-entropy`, and `cineform-color` all build on, and the bitstream
//! reader/writer that `cineform-entropy` and `cineform-container` both sit on top of.

pub mod arena;
pub mod checksum;
pub mod common;
pub mod errors;
pub mod frame;
pub mod io;
pub mod plane;
pub mod util;
pub mod wavelet;

pub use common::{FourCc, Tier};
pub use errors::{CineformError, Result};
pub use frame::{EncodedFormat, Frame, MAX_CHANNELS};
pub use plane::{PixelPlane, SampleKind};
