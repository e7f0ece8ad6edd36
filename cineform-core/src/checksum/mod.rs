// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! The `checksum` module provides implementations of the error-detecting codes used elsewhere in
//! the workspace (presently just the CRC-32 backing the `Look-CRC` metadata field).

mod crc32;

pub use crc32::{crc32, Crc32};
