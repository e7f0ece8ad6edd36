// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! Recognized metadata tag numbers and their payload decoding, built on
//! `cineform-container`'s generic `ChunkReader`/`ChunkType`.

use cineform_container::chunk::{ChunkHeader, ChunkType};

macro_rules! metadata_tags {
    ($($name:ident = $value:expr),+ $(,)?) => {
        $(pub const $name: u16 = $value;)+
    };
}

metadata_tags! {
    CLIP_GUID = 0x8001,
    ENCODED_FORMAT = 0x8002,
    BAYER_FORMAT = 0x8003,
    ENCODE_CURVE = 0x8004,
    DECODE_CURVE = 0x8005,
    LOOK_CRC = 0x8006,
    WHITE_BALANCE = 0x8007,
    COLOR_MATRIX = 0x8008,
    GAMMA_TWEAKS = 0x8009,
    PROCESS_PATH_FLAGS = 0x800a,
    UNIQUE_FRAME_NUMBER = 0x800b,
    TIMECODE = 0x800c,
    FRAMING_ZOOM = 0x800d,
    FRAMING_OFFSET_X = 0x800e,
    FRAMING_OFFSET_Y = 0x800f,
    FRAMING_ROTATION = 0x8010,
    FRAMING_TILT = 0x8011,
    FRAMING_KEYSTONE = 0x8012,
    CPU_LIMIT = 0x8013,
    CPU_AFFINITY = 0x8014,
    COLORSPACE_OVERRIDE = 0x8015,
}

/// Reads a big-endian `u32` payload (`ChunkType::U32`/`I32`).
pub fn read_u32(payload: &[u8]) -> Option<u32> {
    payload.get(..4).map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

pub fn read_u16(payload: &[u8]) -> Option<u16> {
    payload.get(..2).map(|b| u16::from_be_bytes([b[0], b[1]]))
}

pub fn read_u8(payload: &[u8]) -> Option<u8> {
    payload.first().copied()
}

pub fn read_f32(payload: &[u8]) -> Option<f32> {
    payload.get(..4).map(|b| f32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

/// Reads a fixed-size array of big-endian `f32`s (`ChunkType::F32Array`).
pub fn read_f32_array<const N: usize>(payload: &[u8]) -> Option<[f32; N]> {
    if payload.len() < N * 4 {
        return None;
    }
    let mut out = [0f32; N];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = f32::from_be_bytes([payload[i * 4], payload[i * 4 + 1], payload[i * 4 + 2], payload[i * 4 + 3]]);
    }
    Some(out)
}

pub fn read_guid(payload: &[u8]) -> Option<[u8; 16]> {
    payload.get(..16).map(|b| b.try_into().unwrap())
}

/// Reads a counted string (`ChunkType::CountedString`): a `u16` length prefix followed by that
/// many UTF-8 bytes.
pub fn read_counted_string(payload: &[u8]) -> Option<String> {
    let len = usize::from(read_u16(payload)?);
    let bytes = payload.get(2..2 + len)?;
    Some(String::from_utf8_lossy(bytes).into_owned())
}

/// Whether `header`'s declared type matches what a reader for `tag` expects; a mismatch is
/// treated the same as an unknown tag (skipped, non-fatal).
pub fn type_matches(tag: u16, ty: ChunkType) -> bool {
    use ChunkType::*;
    match tag {
        CLIP_GUID => ty == Guid,
        ENCODED_FORMAT => ty == U16,
        BAYER_FORMAT | COLORSPACE_OVERRIDE => ty == U8,
        ENCODE_CURVE | DECODE_CURVE | PROCESS_PATH_FLAGS | UNIQUE_FRAME_NUMBER | CPU_LIMIT | CPU_AFFINITY => {
            matches!(ty, U32 | I32)
        }
        WHITE_BALANCE | COLOR_MATRIX | GAMMA_TWEAKS => ty == F32Array,
        TIMECODE => ty == CountedString,
        FRAMING_ZOOM | FRAMING_OFFSET_X | FRAMING_OFFSET_Y | FRAMING_ROTATION | FRAMING_TILT | FRAMING_KEYSTONE => {
            ty == F32
        }
        _ => false,
    }
}

/// A recognized metadata chunk, already range/type-checked against [`type_matches`].
pub struct RecognizedChunk<'a> {
    pub header: ChunkHeader,
    pub payload: &'a [u8],
}
