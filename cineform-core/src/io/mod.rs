// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! The `io` module implements the bit-level I/O primitives shared by the entropy coder and the
//! sample container. There is no byte-stream/file-source layer here: every sample is already in
//! memory, so the module shrinks to just the bit reader/writer pair.

mod bit;

pub use bit::{BitReader, BitWriter};
