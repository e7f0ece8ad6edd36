// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! `cineform-container` implements the TLV sample chunk format: the chunk
//! header/payload framing, the sample header, and the per-channel/level/band structural records
//! that wrap each band's entropy-coded payload. Metadata-range tags are recognized but left
//! opaque, forwarded to `cineform-metadata`.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::comparison_chain)]
#![allow(clippy::identity_op)]

pub mod band;
pub mod chunk;
pub mod sample;
pub mod tags;

pub use band::BandHeader;
pub use chunk::{ChunkHeader, ChunkReader, ChunkType, ChunkWriter};
pub use sample::{SampleChunk, SampleHeader, SampleWalker, SAMPLE_MAGIC};
pub use tags::StructuralTag;
