// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! The encode half of the session orchestrator: unpack the caller's wire format, run each
//! channel through the wavelet ladder, quantizer, and entropy coder, and frame the result as a
//! TLV sample.

use cineform_color::Channel;
use cineform_container::band::{write_band_payload, write_channel_index, write_wavelet_level, BandHeader};
use cineform_container::chunk::{ChunkType, ChunkWriter};
use cineform_container::sample::{write_sample_end, SampleHeader};
use cineform_container::tags;
use cineform_core::errors::Result;
use cineform_core::wavelet::BandKind;
use cineform_entropy::{companding, Codebook, CodebookLimits};
use cineform_wavelet::prescale::{PrescaleLadder, RoundingBias};
use cineform_wavelet::quantize::quantize;
use cineform_wavelet::transform::{forward_wavelet, Grid, LevelBands, Organization};

use crate::frame::{encoded_format_for, Frame};
use crate::reconstruct::{
    channel_data_from_grid, grid_from_channel_data, invert_tree, level_dims, requantize_grid, DEFAULT_HIGHPASS_QUANTIZER,
    DEFAULT_LEVELS, LOSSLESS_QUANTIZER,
};
use crate::session::{Session, StoredKeyframe};

/// Generous upper bound on a band's entropy-coded payload: every coefficient as an out-of-range
/// peak (6 bytes) plus a worst-case codeword still fits comfortably inside this per-coefficient budget.
fn band_buffer_capacity(coefficient_count: usize) -> usize {
    64 + coefficient_count * 12
}

/// Encodes `frame` into a complete TLV sample.
pub(crate) fn encode_frame(session: &mut Session, frame: &Frame) -> Result<Vec<u8>> {
    let encoded_format = encoded_format_for(frame.pixel_format);
    let channels = cineform_color::unpack(frame.pixel_format, frame.width as usize, frame.height as usize, &frame.data)?;

    let highpass_q = if session.config().lossless() { LOSSLESS_QUANTIZER } else { DEFAULT_HIGHPASS_QUANTIZER };
    let ladder = if session.config().lossless() { PrescaleLadder::REVERSIBLE } else { PrescaleLadder::NORMAL };
    let rounding_bias = if session.config().lossless() {
        RoundingBias::Reversible.bias_for_divide_by_8()
    }
    else {
        RoundingBias::NORMAL.bias_for_divide_by_8()
    };
    let codebook = Codebook::new(CodebookLimits::default());

    let included: Vec<usize> = channels
        .iter()
        .enumerate()
        .filter(|(idx, channel)| !channel_is_unchanged(session, frame, encoded_format, *idx, channel))
        .map(|(idx, _)| idx)
        .collect();

    let mut out = Vec::new();
    SampleHeader {
        format: encoded_format,
        width: frame.width as u16,
        height: frame.height as u16,
        display_height: frame.display_height as u16,
        level_count: DEFAULT_LEVELS,
        channel_count: included.len() as u8,
        is_keyframe: frame.is_keyframe,
    }
    .write(&mut out)?;

    let mut total_peaks = 0usize;
    let mut reconstructed_channels: Vec<Vec<i16>> = vec![Vec::new(); channels.len()];
    let mut channel_dims: Vec<(usize, usize)> = channels.iter().map(|c| (c.width, c.height)).collect();

    for &channel_index in &included {
        let channel = &channels[channel_index];
        write_channel_index(&mut out, channel_index as u8)?;
        ChunkWriter::new(&mut out).write_chunk(
            tags::CHANNEL_SIZE,
            ChunkType::Bytes,
            &[(channel.width as u32).to_be_bytes(), (channel.height as u32).to_be_bytes()].concat(),
        )?;

        let dims = level_dims(channel.width, channel.height, DEFAULT_LEVELS);
        let grid = grid_from_channel_data(&channel.data, channel.width, channel.height);
        let tree = forward_wavelet(&grid, Organization::Progressive { levels: DEFAULT_LEVELS }, &ladder, rounding_bias);
        let root = tree.levels.len() - 1;

        let mut requantized: Vec<LevelBands> = Vec::with_capacity(tree.levels.len());
        for (level_index, level_bands) in tree.levels.iter().enumerate() {
            write_wavelet_level(&mut out, level_index as u8)?;

            if level_index == root {
                let (written, peaks) = encode_band(
                    &mut out,
                    &codebook,
                    BandKind::Ll,
                    &level_bands.ll,
                    LOSSLESS_QUANTIZER,
                    0,
                    false,
                )?;
                let _ = written;
                total_peaks += peaks;
            }

            for (kind, band) in [(BandKind::Lh, &level_bands.lh), (BandKind::Hl, &level_bands.hl), (BandKind::Hh, &level_bands.hh)] {
                let (written, peaks) = encode_band(&mut out, &codebook, kind, band, highpass_q, level_bands.highpass_scale, true)?;
                let _ = written;
                total_peaks += peaks;
            }

            requantized.push(LevelBands {
                ll: requantize_grid(&level_bands.ll, LOSSLESS_QUANTIZER),
                lh: requantize_grid(&level_bands.lh, highpass_q),
                hl: requantize_grid(&level_bands.hl, highpass_q),
                hh: requantize_grid(&level_bands.hh, highpass_q),
                highpass_scale: level_bands.highpass_scale,
            });
        }

        let reconstructed_grid = invert_tree(&requantized, &dims, rounding_bias);
        reconstructed_channels[channel_index] = channel_data_from_grid(&reconstructed_grid);
    }
    write_sample_end(&mut out)?;

    for (idx, channel) in channels.iter().enumerate() {
        if !included.contains(&idx) {
            if let Some(keyframe) = &session.keyframe {
                reconstructed_channels[idx] = keyframe.channels.get(idx).cloned().unwrap_or_default();
                channel_dims[idx] = (channel.width, channel.height);
            }
        }
    }

    session.stats.record_encode(out.len(), total_peaks);

    if frame.is_keyframe {
        session.keyframe = Some(StoredKeyframe {
            format: encoded_format,
            width: frame.width as usize,
            height: frame.height as usize,
            channels: reconstructed_channels,
            channel_dims,
        });
    }

    Ok(out)
}

/// Whether `channel` is byte-for-byte identical to the same channel index in the session's
/// stored keyframe — the only case a difference frame is allowed to omit it entirely. A
/// difference (P) frame encodes only the changed channels against the most recent keyframe
/// held in the session.
fn channel_is_unchanged(
    session: &Session,
    frame: &Frame,
    encoded_format: cineform_core::frame::EncodedFormat,
    channel_index: usize,
    channel: &Channel,
) -> bool {
    if frame.is_keyframe {
        return false;
    }
    let Some(keyframe) = &session.keyframe else { return false };
    keyframe.format == encoded_format
        && keyframe.channel_dims.get(channel_index) == Some(&(channel.width, channel.height))
        && keyframe.channels.get(channel_index).map(Vec::as_slice) == Some(channel.data.as_slice())
}

#[allow(clippy::too_many_arguments)]
fn encode_band(
    out: &mut Vec<u8>,
    codebook: &Codebook,
    kind: BandKind,
    grid: &Grid,
    quantizer: u16,
    scale: u8,
    signed: bool,
) -> Result<(usize, usize)> {
    let quantized: Vec<i32> = (0..grid.height).flat_map(|y| grid.row(y).iter().map(|&v| quantize(v, quantizer))).collect();

    BandHeader { kind, width: grid.width as u16, height: grid.height as u16, scale, quantizer, signed }.write(out)?;

    let mut buf = vec![0u8; band_buffer_capacity(quantized.len())];
    let written = cineform_entropy::encode_band(codebook, &mut buf, &quantized)?;
    write_band_payload(out, &buf[..written])?;

    let peaks = quantized.iter().filter(|v| v.abs() > companding::INPUT_LIMIT).count();
    Ok((written, peaks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::session::Session;
    use cineform_color::PixelFormat;

    fn solid_frame(value: u8, width: u32, height: u32) -> Frame {
        let data = vec![value; (width * height * 2) as usize];
        Frame::new(PixelFormat::Yuyv, width, height, height, data).unwrap()
    }

    #[test]
    fn keyframe_encodes_every_channel() {
        let mut session = Session::new(SessionConfig::new());
        let frame = solid_frame(128, 8, 4);
        let sample = encode_frame(&mut session, &frame).unwrap();
        assert!(!sample.is_empty());
        assert!(session.keyframe.is_some());
    }

    #[test]
    fn identical_difference_frame_omits_every_channel() {
        let mut session = Session::new(SessionConfig::new());
        let keyframe = solid_frame(128, 8, 4);
        encode_frame(&mut session, &keyframe).unwrap();

        let diff = solid_frame(128, 8, 4).as_difference();
        let sample = encode_frame(&mut session, &diff).unwrap();

        let header = cineform_container::sample::SampleHeader::parse(&sample[8..]).unwrap();
        assert_eq!(header.channel_count, 0);
    }

    #[test]
    fn changed_difference_frame_includes_channels() {
        let mut session = Session::new(SessionConfig::new());
        let keyframe = solid_frame(128, 8, 4);
        encode_frame(&mut session, &keyframe).unwrap();

        let diff = solid_frame(64, 8, 4).as_difference();
        let sample = encode_frame(&mut session, &diff).unwrap();

        let header = cineform_container::sample::SampleHeader::parse(&sample[8..]).unwrap();
        assert!(header.channel_count > 0);
    }
}
