// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! Channel, wavelet-level, and band structural records.

use cineform_core::errors::{CineformError, Result};
use cineform_core::wavelet::{BandKind, StoragePolicy};

use crate::chunk::{ChunkType, ChunkWriter};
use crate::tags::{BAND_HEADER, BAND_PAYLOAD, CHANNEL_INDEX, WAVELET_LEVEL};

/// `BAND_PAYLOAD` chunk: the entropy-coded coefficient stream for the band whose header preceded
/// it. `cineform-entropy` produces `payload` already word-padded; this just wraps it in a chunk.
pub fn write_band_payload(out: &mut Vec<u8>, payload: &[u8]) -> Result<()> {
    let mut padded = payload.to_vec();
    while padded.len() % 4 != 0 {
        padded.push(0);
    }
    ChunkWriter::new(out).write_chunk(BAND_PAYLOAD, ChunkType::Bytes, &padded)
}

/// `CHANNEL_INDEX` chunk payload: which semantic channel
/// the following level/band records belong to.
pub fn write_channel_index(out: &mut Vec<u8>, channel: u8) -> Result<()> {
    ChunkWriter::new(out).write_chunk(CHANNEL_INDEX, ChunkType::U32, &u32::from(channel).to_be_bytes())
}

pub fn parse_channel_index(payload: &[u8]) -> Result<u8> {
    if payload.len() < 4 {
        return Err(CineformError::CorruptBitstream("channel index chunk too short"));
    }
    let value = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]);
    u8::try_from(value).map_err(|_| CineformError::CorruptBitstream("channel index out of range"))
}

/// `WAVELET_LEVEL` chunk payload: which level (0 = finest) of the channel's tree follows.
pub fn write_wavelet_level(out: &mut Vec<u8>, level: u8) -> Result<()> {
    ChunkWriter::new(out).write_chunk(WAVELET_LEVEL, ChunkType::U32, &u32::from(level).to_be_bytes())
}

pub fn parse_wavelet_level(payload: &[u8]) -> Result<u8> {
    if payload.len() < 4 {
        return Err(CineformError::CorruptBitstream("wavelet level chunk too short"));
    }
    let value = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]);
    u8::try_from(value).map_err(|_| CineformError::CorruptBitstream("wavelet level out of range"))
}

fn band_kind_tag(kind: BandKind) -> u8 {
    match kind {
        BandKind::Ll => 0,
        BandKind::Lh => 1,
        BandKind::Hl => 2,
        BandKind::Hh => 3,
    }
}

fn band_kind_from_tag(tag: u8) -> Result<BandKind> {
    match tag {
        0 => Ok(BandKind::Ll),
        1 => Ok(BandKind::Lh),
        2 => Ok(BandKind::Hl),
        3 => Ok(BandKind::Hh),
        _ => Err(CineformError::CorruptBitstream("unrecognized band kind tag")),
    }
}

/// `BAND_HEADER` chunk payload: which band, its dimensions, scale
/// exponent, quantization divisor, and storage policy. The band's entropy-coded payload itself
/// follows in a separate `BAND_PAYLOAD` chunk.
#[derive(Copy, Clone, Debug)]
pub struct BandHeader {
    pub kind: BandKind,
    pub width: u16,
    pub height: u16,
    pub scale: u8,
    pub quantizer: u16,
    pub signed: bool,
}

const BAND_HEADER_LEN: usize = 12;

impl BandHeader {
    pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        let mut payload = Vec::with_capacity(BAND_HEADER_LEN);
        payload.push(band_kind_tag(self.kind));
        payload.push(self.scale);
        payload.extend_from_slice(&self.width.to_be_bytes());
        payload.extend_from_slice(&self.height.to_be_bytes());
        payload.extend_from_slice(&self.quantizer.to_be_bytes());
        payload.push(self.signed as u8);
        payload.push(0);
        payload.extend_from_slice(&[0, 0]);
        debug_assert_eq!(payload.len(), BAND_HEADER_LEN);

        ChunkWriter::new(out).write_chunk(BAND_HEADER, ChunkType::Bytes, &payload)
    }

    pub fn parse(payload: &[u8]) -> Result<BandHeader> {
        if payload.len() < BAND_HEADER_LEN {
            return Err(CineformError::CorruptBitstream("band header chunk too short"));
        }

        let kind = band_kind_from_tag(payload[0])?;
        let scale = payload[1];
        let width = u16::from_be_bytes([payload[2], payload[3]]);
        let height = u16::from_be_bytes([payload[4], payload[5]]);
        let quantizer = u16::from_be_bytes([payload[6], payload[7]]);
        let signed = payload[8] != 0;

        if width == 0 || height == 0 {
            return Err(CineformError::CorruptBitstream("band header declares a zero dimension"));
        }
        if quantizer == 0 {
            return Err(CineformError::CorruptBitstream("band quantizer must be >= 1"));
        }
        if kind == BandKind::Ll && quantizer != 1 {
            return Err(CineformError::CorruptBitstream("LL band quantizer must be 1"));
        }

        Ok(BandHeader {
            kind,
            width,
            height,
            scale,
            quantizer,
            signed,
        })
    }

    pub fn storage_policy(&self) -> StoragePolicy {
        if self.signed { StoragePolicy::Signed } else { StoragePolicy::Unsigned }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_header_round_trips() {
        let header = BandHeader { kind: BandKind::Hl, width: 320, height: 180, scale: 2, quantizer: 7, signed: true };
        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();

        let mut r = crate::chunk::ChunkReader::new(&buf);
        let (h, payload) = r.next().unwrap().unwrap();
        assert_eq!(h.tag, BAND_HEADER);
        let parsed = BandHeader::parse(payload).unwrap();
        assert_eq!(parsed.kind, BandKind::Hl);
        assert_eq!(parsed.width, 320);
        assert_eq!(parsed.quantizer, 7);
        assert!(parsed.signed);
    }

    #[test]
    fn ll_band_requires_unit_quantizer() {
        let header = BandHeader { kind: BandKind::Ll, width: 320, height: 180, scale: 0, quantizer: 3, signed: false };
        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();
        let mut r = crate::chunk::ChunkReader::new(&buf);
        let (_, payload) = r.next().unwrap().unwrap();
        assert!(matches!(BandHeader::parse(payload), Err(CineformError::CorruptBitstream(_))));
    }
}
