// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! `cineform-entropy` implements the VLC/FSM entropy codec and the companding curve and peaks
//! table it depends on. Quantization itself (dividing wavelet coefficients by a band's `Q`)
//! lives in `cineform-wavelet`; this crate only ever sees values already on the companded
//! integer axis.
//!
//! Grounded on `original_source/Codec/vlc.h`'s `FSMENTRY_UNPACKED`/`RMCBOOK` declarations. The
//! GoPro-tuned Huffman table data itself (`table3x.inc`/`table3z.inc`) isn't available here, so
//! [`codebook`] builds a substitute prefix-free code from first principles; see `DESIGN.md`.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod codebook;
pub mod companding;
pub mod fsm;
pub mod peaks;

pub use codebook::{Codebook, CodebookLimits, Symbol, BAND_END};
pub use fsm::{Fsm, FsmEntry};
pub use peaks::{Peak, PeaksTable};

use cineform_core::errors::{CineformError, Result};
use cineform_core::io::{BitReader, BitWriter};

/// Bytes reserved at the front of an entropy-coded band payload to record where the bitstream
/// ends and the peaks table begins, so `decode_band` is self-contained given only the payload
/// (the band header carries the coefficient count and quantizer, not this split point).
const HEADER_LEN: usize = 4;

/// Encodes one band's raster-order, already-quantized coefficients: companding, peak extraction,
/// run/magnitude symbol emission, and the trailing peaks table, in that order. Returns the number of bytes written to `out`, which starts with a 4-byte bitstream
/// length prefix consumed by [`decode_band`].
pub fn encode_band(codebook: &Codebook, out: &mut [u8], coefficients: &[i32]) -> Result<usize> {
    let mut companded = Vec::with_capacity(coefficients.len());
    let mut peaks = PeaksTable::new();

    for (offset, &value) in coefficients.iter().enumerate() {
        let clamped = value.clamp(-(companding::INPUT_LIMIT), companding::INPUT_LIMIT) as i16;
        if i32::from(clamped) != value {
            peaks.push(offset as u32, value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16);
        }
        companded.push(companding::compand(clamped));
    }

    let mut writer = BitWriter::new(&mut out[HEADER_LEN..]);
    fsm::encode_band(codebook, &mut writer, &companded)?;
    let bitstream_len = writer.finish()?;

    out[..HEADER_LEN].copy_from_slice(&(bitstream_len as u32).to_be_bytes());

    let mut peaks_buf = Vec::new();
    peaks.write(&mut peaks_buf);
    let peaks_start = HEADER_LEN + bitstream_len;
    out[peaks_start..peaks_start + peaks_buf.len()].copy_from_slice(&peaks_buf);

    Ok(peaks_start + peaks_buf.len())
}

/// Decodes `count` coefficients from a band payload produced by [`encode_band`]: FSM decode, sign
/// undo, decompanding, and peak substitution, in that order.
pub fn decode_band(fsm: &Fsm, payload: &[u8], count: usize) -> Result<Vec<i32>> {
    if payload.len() < HEADER_LEN {
        return Err(CineformError::CorruptBitstream("band payload shorter than its length prefix"));
    }
    let bitstream_len =
        u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]) as usize;
    let bitstream_end = HEADER_LEN + bitstream_len;
    if bitstream_end > payload.len() {
        return Err(CineformError::CorruptBitstream("band bitstream length prefix runs past payload"));
    }

    let mut reader = BitReader::new(&payload[HEADER_LEN..bitstream_end]);
    let mut companded = Vec::with_capacity(count);
    fsm.decode_band(&mut reader, count, &mut companded)?;

    let mut coefficients: Vec<i32> = companded.iter().map(|&v| i32::from(companding::expand(v))).collect();

    if bitstream_end < payload.len() {
        let peaks = PeaksTable::parse(&payload[bitstream_end..])?;
        for peak in peaks.iter() {
            if let Some(slot) = coefficients.get_mut(peak.offset as usize) {
                *slot = i32::from(peak.value);
            }
        }
    }

    Ok(coefficients)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_round_trips_through_compand_and_fsm() {
        let codebook = Codebook::new(CodebookLimits::default());
        let fsm = Fsm::build(&codebook);
        let coefficients: Vec<i32> = vec![0, 0, 10, -5, 0, 0, 0, 3, 0];

        let mut buf = vec![0u8; 256];
        let written = encode_band(&codebook, &mut buf, &coefficients).unwrap();

        let decoded = decode_band(&fsm, &buf[..written], coefficients.len()).unwrap();
        assert_eq!(decoded, coefficients);
    }

    #[test]
    fn out_of_range_coefficient_round_trips_via_peaks() {
        let codebook = Codebook::new(CodebookLimits::default());
        let fsm = Fsm::build(&codebook);
        let coefficients: Vec<i32> = vec![0, 20000, 0];

        let mut buf = vec![0u8; 256];
        let written = encode_band(&codebook, &mut buf, &coefficients).unwrap();

        let decoded = decode_band(&fsm, &buf[..written], coefficients.len()).unwrap();
        assert_eq!(decoded, coefficients);
    }

    #[test]
    fn truncated_payload_is_reported_not_panicked() {
        assert!(matches!(
            decode_band(&Fsm::build(&Codebook::new(CodebookLimits::default())), &[0, 0], 4),
            Err(CineformError::CorruptBitstream(_))
        ));
    }
}
