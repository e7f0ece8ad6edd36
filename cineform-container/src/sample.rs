// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! The sample header chunk and the whole-sample
//! walk that dispatches structural tags to their section and forwards metadata tags onward
//!.

use cineform_core::common::FourCc;
use cineform_core::errors::{CineformError, Result};
use cineform_core::frame::EncodedFormat;

use crate::chunk::{ChunkReader, ChunkType, ChunkWriter};
use crate::tags::{StructuralTag, SAMPLE_END, SAMPLE_HEADER};

/// Writes the terminal `SAMPLE_END` marker chunk.
pub fn write_sample_end(out: &mut Vec<u8>) -> Result<()> {
    ChunkWriter::new(out).write_chunk(SAMPLE_END, ChunkType::U32, &0u32.to_be_bytes())
}

/// `'CFHD'` magic, big-endian.
pub const SAMPLE_MAGIC: FourCc = FourCc::new(*b"CFHD");

/// Current wire format version this crate reads and writes.
pub const FORMAT_VERSION: u16 = 1;

fn encoded_format_tag(format: EncodedFormat) -> u16 {
    match format {
        EncodedFormat::Yuv422 => 0,
        EncodedFormat::Rgb => 1,
        EncodedFormat::Rgba => 2,
        EncodedFormat::Bayer4 => 3,
        EncodedFormat::Gray => 4,
    }
}

fn encoded_format_from_tag(tag: u16) -> Result<EncodedFormat> {
    match tag {
        0 => Ok(EncodedFormat::Yuv422),
        1 => Ok(EncodedFormat::Rgb),
        2 => Ok(EncodedFormat::Rgba),
        3 => Ok(EncodedFormat::Bayer4),
        4 => Ok(EncodedFormat::Gray),
        _ => Err(CineformError::UnsupportedSample("unrecognized encoded-format tag")),
    }
}

/// The sample header: magic, version, encoded format, dimensions, and the
/// key/difference flag.
#[derive(Copy, Clone, Debug)]
pub struct SampleHeader {
    pub format: EncodedFormat,
    pub width: u16,
    pub height: u16,
    pub display_height: u16,
    pub level_count: u8,
    pub channel_count: u8,
    pub is_keyframe: bool,
}

/// Byte size of the encoded sample header payload (17 meaningful bytes, padded to the next word).
const HEADER_PAYLOAD_LEN: usize = 20;

impl SampleHeader {
    pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        let mut payload = Vec::with_capacity(HEADER_PAYLOAD_LEN);
        payload.extend_from_slice(&SAMPLE_MAGIC.get());
        payload.extend_from_slice(&FORMAT_VERSION.to_be_bytes());
        payload.extend_from_slice(&encoded_format_tag(self.format).to_be_bytes());
        payload.extend_from_slice(&self.width.to_be_bytes());
        payload.extend_from_slice(&self.height.to_be_bytes());
        payload.extend_from_slice(&self.display_height.to_be_bytes());
        payload.push(self.level_count);
        payload.push(self.channel_count);
        payload.push(self.is_keyframe as u8);
        payload.resize(HEADER_PAYLOAD_LEN, 0);

        ChunkWriter::new(out).write_chunk(SAMPLE_HEADER, ChunkType::Bytes, &payload)
    }

    pub fn parse(payload: &[u8]) -> Result<SampleHeader> {
        if payload.len() < 17 {
            return Err(CineformError::CorruptBitstream("sample header chunk too short"));
        }

        let magic = FourCc::new([payload[0], payload[1], payload[2], payload[3]]);
        if magic != SAMPLE_MAGIC {
            return Err(CineformError::UnsupportedSample("bad sample magic"));
        }

        let version = u16::from_be_bytes([payload[4], payload[5]]);
        if version > FORMAT_VERSION {
            return Err(CineformError::UnsupportedSample("sample format version newer than supported"));
        }

        let format = encoded_format_from_tag(u16::from_be_bytes([payload[6], payload[7]]))?;
        let width = u16::from_be_bytes([payload[8], payload[9]]);
        let height = u16::from_be_bytes([payload[10], payload[11]]);
        let display_height = u16::from_be_bytes([payload[12], payload[13]]);
        let level_count = payload[14];
        let channel_count = payload[15];
        let is_keyframe = payload[16] != 0;

        if width == 0 || height == 0 {
            return Err(CineformError::InvalidArgument("sample header declares a zero dimension"));
        }
        if display_height > height {
            return Err(CineformError::CorruptBitstream("display_height exceeds height"));
        }

        Ok(SampleHeader { format, width, height, display_height, level_count, channel_count, is_keyframe })
    }
}

/// One structural chunk's worth of dispatch target: either a section this crate understands, or
/// an opaque metadata blob.
pub enum SampleChunk<'a> {
    Header(SampleHeader),
    Structural { tag: StructuralTag, payload: &'a [u8] },
    Metadata { tag: u16, ty: ChunkType, payload: &'a [u8] },
}

/// Walks every top-level chunk of a sample, dispatching structural tags by name and surfacing
/// unrecognized metadata tags for the caller (`cineform`/`cineform-metadata`) to interpret.
pub struct SampleWalker<'a> {
    reader: ChunkReader<'a>,
}

impl<'a> SampleWalker<'a> {
    pub fn new(sample: &'a [u8]) -> Self {
        SampleWalker { reader: ChunkReader::new(sample) }
    }

    pub fn next(&mut self) -> Result<Option<SampleChunk<'a>>> {
        let Some((header, payload)) = self.reader.next()? else {
            return Ok(None);
        };

        if header.is_metadata() {
            return Ok(Some(SampleChunk::Metadata { tag: header.tag, ty: header.ty, payload }));
        }

        let structural = StructuralTag::from_raw(header.tag)?;
        if structural == StructuralTag::SampleHeader {
            return Ok(Some(SampleChunk::Header(SampleHeader::parse(payload)?)));
        }

        Ok(Some(SampleChunk::Structural { tag: structural, payload }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips() {
        let header = SampleHeader {
            format: EncodedFormat::Yuv422,
            width: 640,
            height: 360,
            display_height: 360,
            level_count: 2,
            channel_count: 3,
            is_keyframe: true,
        };

        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();

        let mut walker = SampleWalker::new(&buf);
        match walker.next().unwrap().unwrap() {
            SampleChunk::Header(parsed) => {
                assert_eq!(parsed.width, 640);
                assert_eq!(parsed.height, 360);
                assert_eq!(parsed.channel_count, 3);
                assert!(parsed.is_keyframe);
            }
            _ => panic!("expected sample header chunk"),
        }
        assert!(walker.next().unwrap().is_none());
    }

    #[test]
    fn bad_magic_is_unsupported() {
        let payload = [0u8; 20];
        assert!(matches!(
            SampleHeader::parse(&payload),
            Err(CineformError::UnsupportedSample(_))
        ));
    }

    #[test]
    fn unknown_metadata_tag_is_surfaced_not_rejected() {
        let mut buf = Vec::new();
        ChunkWriter::new(&mut buf).write_chunk(0xbeef, ChunkType::Bytes, &[1, 2, 3, 4]).unwrap();

        let mut walker = SampleWalker::new(&buf);
        match walker.next().unwrap().unwrap() {
            SampleChunk::Metadata { tag, payload, .. } => {
                assert_eq!(tag, 0xbeef);
                assert_eq!(payload, &[1, 2, 3, 4]);
            }
            _ => panic!("expected metadata chunk"),
        }
    }

    #[test]
    fn unknown_structural_tag_is_unsupported() {
        let mut buf = Vec::new();
        ChunkWriter::new(&mut buf).write_chunk(0x0123, ChunkType::Bytes, &[0; 4]).unwrap();

        let mut walker = SampleWalker::new(&buf);
        assert!(matches!(walker.next(), Err(CineformError::UnsupportedSample(_))));
    }
}
