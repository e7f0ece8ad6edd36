// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! Generic TLV chunk framing.
//!
//! A chunk header is two 32-bit words: `tag:u16` + 16 reserved bits, then `length_words:u24` +
//! `type:u8`. Fixing the header at two whole words is what lets "chunks are aligned to a 32-bit word boundary" hold for
//! the chunk as a whole, header included, with no implicit padding byte count to track — the
//! tradeoff recorded in `DESIGN.md`. Generalized from RIFF's 4-byte tag/length pair to this
//! format's wider length field, and from a `ReadBytes`-generic stream to a plain in-memory slice
//! cursor, since every sample here is already fully buffered.

use cineform_core::errors::{CineformError, Result};

pub const HEADER_LEN: usize = 8;

/// Tag numbers `>= METADATA_TAG_BASE` are opaque to this crate and forwarded to
/// `cineform-metadata` unparsed.
pub const METADATA_TAG_BASE: u16 = 0x8000;

/// The single-ASCII-character payload interpretation tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkType {
    U32,
    I32,
    U16,
    U8,
    F32,
    F32Array,
    /// Length-prefixed string.
    CountedString,
    /// Opaque byte array.
    Bytes,
    /// 16-byte GUID.
    Guid,
    /// Big tag: an opaque container that can itself be parsed as a nested sequence of chunks.
    BigTag,
}

impl ChunkType {
    pub fn from_ascii(c: u8) -> Result<ChunkType> {
        match c {
            b'L' => Ok(ChunkType::U32),
            b'l' => Ok(ChunkType::I32),
            b'H' => Ok(ChunkType::U16),
            b'B' => Ok(ChunkType::U8),
            b'f' => Ok(ChunkType::F32),
            b'F' => Ok(ChunkType::F32Array),
            b's' => Ok(ChunkType::CountedString),
            b'c' => Ok(ChunkType::Bytes),
            b'G' => Ok(ChunkType::Guid),
            b'T' => Ok(ChunkType::BigTag),
            _ => Err(CineformError::UnsupportedSample("unrecognized chunk type byte")),
        }
    }

    pub fn to_ascii(self) -> u8 {
        match self {
            ChunkType::U32 => b'L',
            ChunkType::I32 => b'l',
            ChunkType::U16 => b'H',
            ChunkType::U8 => b'B',
            ChunkType::F32 => b'f',
            ChunkType::F32Array => b'F',
            ChunkType::CountedString => b's',
            ChunkType::Bytes => b'c',
            ChunkType::Guid => b'G',
            ChunkType::BigTag => b'T',
        }
    }
}

/// A parsed chunk header: tag, payload length in bytes, and type.
#[derive(Copy, Clone, Debug)]
pub struct ChunkHeader {
    pub tag: u16,
    pub length_words: u32,
    pub ty: ChunkType,
}

impl ChunkHeader {
    pub fn is_metadata(&self) -> bool {
        self.tag >= METADATA_TAG_BASE
    }

    pub fn payload_len(&self) -> usize {
        self.length_words as usize * 4
    }
}

/// Sequentially reads `(header, payload)` pairs out of an in-memory sample buffer.
///
/// The only state carried between calls is a byte offset; unknown tags are the caller's
/// responsibility to skip.
pub struct ChunkReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ChunkReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        ChunkReader { buf, pos: 0 }
    }

    pub fn byte_offset(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Reads the next chunk header and its payload slice, advancing past both. Returns `Ok(None)`
    /// at a clean end of buffer (zero bytes remaining).
    pub fn next(&mut self) -> Result<Option<(ChunkHeader, &'a [u8])>> {
        if self.remaining() == 0 {
            return Ok(None);
        }

        if self.remaining() < HEADER_LEN {
            return Err(CineformError::CorruptBitstream("chunk header truncated"));
        }

        let h = &self.buf[self.pos..self.pos + HEADER_LEN];
        let tag = u16::from_be_bytes([h[0], h[1]]);
        let length_words = u32::from_be_bytes([0, h[4], h[5], h[6]]);
        let ty = ChunkType::from_ascii(h[7])?;

        let header = ChunkHeader { tag, length_words, ty };
        let payload_len = header.payload_len();

        let payload_start = self.pos + HEADER_LEN;
        let payload_end = payload_start
            .checked_add(payload_len)
            .ok_or(CineformError::CorruptBitstream("chunk length overflowed sample"))?;

        if payload_end > self.buf.len() {
            return Err(CineformError::CorruptBitstream(
                "chunk payload length exceeds remaining sample bytes",
            ));
        }

        self.pos = payload_end;
        Ok(Some((header, &self.buf[payload_start..payload_end])))
    }
}

/// Appends `(header, payload)` pairs into a caller-supplied output buffer.
pub struct ChunkWriter<'a> {
    out: &'a mut Vec<u8>,
    _marker: std::marker::PhantomData<()>,
}

impl<'a> ChunkWriter<'a> {
    pub fn new(out: &'a mut Vec<u8>) -> Self {
        ChunkWriter { out, _marker: std::marker::PhantomData }
    }

    /// Writes a chunk header followed by `payload`. `payload.len()` must be a multiple of 4;
    /// callers are expected to pad band/metadata payloads themselves before calling this (the
    /// writer does not silently insert padding, so a caller forgetting to pad produces a sample
    /// with a mis-declared `length_words` rather than silent corruption).
    pub fn write_chunk(&mut self, tag: u16, ty: ChunkType, payload: &[u8]) -> Result<()> {
        if payload.len() % 4 != 0 {
            return Err(CineformError::InvalidArgument("chunk payload must be word-aligned"));
        }

        let length_words = u32::try_from(payload.len() / 4)
            .map_err(|_| CineformError::InvalidArgument("chunk payload too large"))?;
        if length_words > 0x00ff_ffff {
            return Err(CineformError::InvalidArgument("chunk length exceeds 24 bits"));
        }

        self.out.extend_from_slice(&tag.to_be_bytes());
        self.out.extend_from_slice(&[0, 0]);
        self.out.extend_from_slice(&length_words.to_be_bytes()[1..]);
        self.out.push(ty.to_ascii());
        self.out.extend_from_slice(payload);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let mut out = Vec::new();
        {
            let mut w = ChunkWriter::new(&mut out);
            w.write_chunk(0x0010, ChunkType::U32, &42u32.to_be_bytes()).unwrap();
            w.write_chunk(0x8001, ChunkType::Bytes, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        }

        let mut r = ChunkReader::new(&out);
        let (h1, p1) = r.next().unwrap().unwrap();
        assert_eq!(h1.tag, 0x0010);
        assert!(!h1.is_metadata());
        assert_eq!(p1, &42u32.to_be_bytes());

        let (h2, p2) = r.next().unwrap().unwrap();
        assert_eq!(h2.tag, 0x8001);
        assert!(h2.is_metadata());
        assert_eq!(p2.len(), 8);

        assert!(r.next().unwrap().is_none());
    }

    #[test]
    fn truncated_length_is_corrupt() {
        let mut out = Vec::new();
        {
            let mut w = ChunkWriter::new(&mut out);
            w.write_chunk(1, ChunkType::U32, &[0; 8]).unwrap();
        }
        out.truncate(out.len() - 4);

        let mut r = ChunkReader::new(&out);
        assert!(matches!(r.next(), Err(CineformError::CorruptBitstream(_))));
    }

    #[test]
    fn unaligned_payload_is_rejected() {
        let mut out = Vec::new();
        let mut w = ChunkWriter::new(&mut out);
        assert!(matches!(
            w.write_chunk(1, ChunkType::Bytes, &[0u8; 3]),
            Err(CineformError::InvalidArgument(_))
        ));
    }
}
