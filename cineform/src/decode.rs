// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! The decode half of the session orchestrator: walk a TLV sample's structural chunks,
//! FSM-decode and dequantize every band, invert the wavelet ladder per channel, forward any
//! in-sample metadata chunks to the metadata database, and pack the reconstructed channels into
//! the caller's requested wire format.

use cineform_color::matrix::{self, ColorMatrix};
use cineform_color::{Channel, PixelFormat};
use cineform_container::band::{parse_channel_index, parse_wavelet_level, BandHeader};
use cineform_container::chunk::{ChunkType, ChunkWriter};
use cineform_container::sample::{SampleChunk, SampleWalker};
use cineform_container::tags::StructuralTag;
use cineform_core::errors::{CineformError, Result};
use cineform_core::frame::EncodedFormat;
use cineform_core::wavelet::BandKind;
use cineform_metadata::{Layer, COMMON_CHANNEL};
use cineform_wavelet::quantize::dequantize;
use cineform_wavelet::transform::{Grid, LevelBands};

use crate::frame::{encoded_format_for, Frame};
use crate::reconstruct::{channel_data_from_grid, invert_tree, level_dims};
use crate::session::{Session, StoredKeyframe};

/// The lifting step's rounding bias is baked identically into both of `encode_frame`'s lossless
/// and lossy paths (`RoundingBias::Reversible` and `RoundingBias::NORMAL` both resolve to `4` for
/// the five-tap filter's divide-by-8, see `cineform_wavelet::prescale`), so the decoder needs no
/// per-sample flag to recover it.
const ROUNDING_BIAS: i32 = 4;

/// One channel's bands as they arrive off the wire, keyed by level index (finest first, matching
/// `level_dims`'s ordering).
#[derive(Default)]
struct ChannelBuild {
    dims: Option<(usize, usize)>,
    levels: Vec<LevelBands>,
}

fn empty_level_bands() -> LevelBands {
    LevelBands { ll: Grid::new(0, 0), lh: Grid::new(0, 0), hl: Grid::new(0, 0), hh: Grid::new(0, 0), highpass_scale: 0 }
}

impl ChannelBuild {
    fn level_mut(&mut self, index: usize) -> &mut LevelBands {
        while self.levels.len() <= index {
            self.levels.push(empty_level_bands());
        }
        &mut self.levels[index]
    }
}

/// Decodes one TLV sample, converting the reconstructed channels to `out_format`. Mirrors
/// `encode::encode_frame`'s shape so both halves of the ladder stay easy to read side by side.
pub(crate) fn decode_frame(session: &mut Session, sample: &[u8], out_format: PixelFormat) -> Result<Frame> {
    let mut walker = SampleWalker::new(sample);

    let header = match walker.next()? {
        Some(SampleChunk::Header(header)) => header,
        _ => return Err(CineformError::UnsupportedSample("sample does not begin with a header chunk")),
    };

    if !header.is_keyframe && session.keyframe.is_none() {
        return Err(CineformError::MissingReference);
    }

    let channel_count = header.format.channel_count();
    let mut builds: Vec<ChannelBuild> = (0..channel_count).map(|_| ChannelBuild::default()).collect();
    let mut current_channel: Option<usize> = None;
    let mut current_level: Option<usize> = None;
    let mut pending_band: Option<BandHeader> = None;
    let mut metadata_buf = Vec::new();

    loop {
        let chunk = match walker.next()? {
            Some(chunk) => chunk,
            None => break,
        };

        match chunk {
            SampleChunk::Header(_) => return Err(CineformError::CorruptBitstream("duplicate sample header")),
            SampleChunk::Metadata { tag, ty, payload } => {
                ChunkWriter::new(&mut metadata_buf).write_chunk(tag, ty, payload)?;
            }
            SampleChunk::Structural { tag, payload } => match tag {
                StructuralTag::SAMPLE_HEADER => unreachable!("dispatched as SampleChunk::Header"),
                StructuralTag::CHANNEL_INDEX => {
                    let index = parse_channel_index(payload)? as usize;
                    if index >= channel_count {
                        return Err(CineformError::CorruptBitstream("channel index exceeds the format's channel count"));
                    }
                    current_channel = Some(index);
                    current_level = None;
                }
                StructuralTag::CHANNEL_SIZE => {
                    let index = current_channel.ok_or(CineformError::CorruptBitstream("channel size with no channel index"))?;
                    if payload.len() < 8 {
                        return Err(CineformError::CorruptBitstream("channel size chunk too short"));
                    }
                    let width = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]) as usize;
                    let height = u32::from_be_bytes([payload[4], payload[5], payload[6], payload[7]]) as usize;
                    builds[index].dims = Some((width, height));
                }
                StructuralTag::WAVELET_LEVEL => {
                    current_channel.ok_or(CineformError::CorruptBitstream("wavelet level with no channel index"))?;
                    current_level = Some(parse_wavelet_level(payload)? as usize);
                }
                StructuralTag::BAND_HEADER => {
                    pending_band = Some(BandHeader::parse(payload)?);
                }
                StructuralTag::BAND_PAYLOAD => {
                    let index = current_channel.ok_or(CineformError::CorruptBitstream("band payload with no channel index"))?;
                    let level = current_level.ok_or(CineformError::CorruptBitstream("band payload with no wavelet level"))?;
                    let band_header =
                        pending_band.take().ok_or(CineformError::CorruptBitstream("band payload with no preceding band header"))?;

                    let fsm = session.fsm_cache.get_or_build(band_header.quantizer, true, &session.stats);
                    let count = band_header.width as usize * band_header.height as usize;
                    let coefficients = cineform_entropy::decode_band(&fsm, payload, count)?;

                    let mut grid = Grid::new(band_header.width as usize, band_header.height as usize);
                    for (offset, value) in coefficients.into_iter().enumerate() {
                        let row = offset / band_header.width as usize;
                        let col = offset % band_header.width as usize;
                        grid.row_mut(row)[col] = dequantize(value, band_header.quantizer);
                    }

                    let bands = builds[index].level_mut(level);
                    bands.highpass_scale = band_header.scale;
                    match band_header.kind {
                        BandKind::Ll => bands.ll = grid,
                        BandKind::Lh => bands.lh = grid,
                        BandKind::Hl => bands.hl = grid,
                        BandKind::Hh => bands.hh = grid,
                    }
                }
                StructuralTag::SAMPLE_END => {
                    current_channel = None;
                    current_level = None;
                }
            },
        }
    }

    let mut channels: Vec<Option<Channel>> = vec![None; channel_count];
    for (index, build) in builds.into_iter().enumerate() {
        let Some((width, height)) = build.dims else { continue };
        if build.levels.is_empty() {
            continue;
        }
        let dims = level_dims(width, height, build.levels.len() as u8);
        let reconstructed = invert_tree(&build.levels, &dims, ROUNDING_BIAS);
        channels[index] = Some(Channel { width, height, data: channel_data_from_grid(&reconstructed) });
    }

    for (index, slot) in channels.iter_mut().enumerate() {
        if slot.is_none() {
            let keyframe = session.keyframe.as_ref().ok_or(CineformError::MissingReference)?;
            if keyframe.format != header.format {
                return Err(CineformError::BadFrame("difference frame's encoded format does not match the stored keyframe"));
            }
            let (width, height) = *keyframe
                .channel_dims
                .get(index)
                .ok_or(CineformError::CorruptBitstream("difference frame omits a channel absent from the keyframe"))?;
            let data = keyframe.channels.get(index).cloned().unwrap_or_default();
            *slot = Some(Channel { width, height, data });
        }
    }
    let channels: Vec<Channel> = channels.into_iter().map(|c| c.expect("every slot filled above")).collect();

    if !metadata_buf.is_empty() {
        session.update_metadata(&metadata_buf, COMMON_CHANNEL, Layer::Frame)?;
    }

    if header.is_keyframe {
        session.keyframe = Some(StoredKeyframe {
            format: header.format,
            width: header.width as usize,
            height: header.height as usize,
            channel_dims: channels.iter().map(|c| (c.width, c.height)).collect(),
            channels: channels.iter().map(|c| c.data.clone()).collect(),
        });
    }

    let out_channels = convert_for_output(header.format, &channels, out_format)?;
    let mut data = vec![0u8; packed_buffer_len(out_format, header.width as usize, header.height as usize)?];
    cineform_color::pack(out_format, &out_channels, &mut data)?;

    session.stats.record_decode();

    Frame::new(out_format, u32::from(header.width), u32::from(header.height), u32::from(header.display_height), data)
        .map(|frame| if header.is_keyframe { frame } else { frame.as_difference() })
}

/// Whether `format` (necessarily a member of the [`EncodedFormat::Yuv422`] family) subsamples
/// chroma both horizontally and vertically (NV12/YV12's 4:2:0), as opposed to horizontally only
///.
fn is_420(format: PixelFormat) -> bool {
    matches!(format, PixelFormat::Nv12 | PixelFormat::Yv12)
}

/// Converts `channels` (decoded at whatever shape the sample's own `encoded_format` carries) into
/// the channel arrangement `out_format`'s packer expects. Same-family
/// requests only ever need chroma resampling; cross-family YUV↔RGB requests additionally run the
/// fixed-point color matrix, defaulting to Rec. 709 computer-system range absent a
/// more specific signal (see `DESIGN.md`).
fn convert_for_output(encoded_format: EncodedFormat, channels: &[Channel], out_format: PixelFormat) -> Result<Vec<Channel>> {
    let target_format = encoded_format_for(out_format);

    match (encoded_format, target_format) {
        (EncodedFormat::Yuv422, EncodedFormat::Yuv422) => {
            let [y, cb, cr] = three(channels)?;
            let target_chroma_height = if is_420(out_format) { y.height.div_ceil(2) } else { y.height };
            Ok(vec![y.clone(), resample_plane(cb, cb.width, target_chroma_height), resample_plane(cr, cr.width, target_chroma_height)])
        }
        (EncodedFormat::Rgb, EncodedFormat::Rgb) | (EncodedFormat::Rgba, EncodedFormat::Rgba) => Ok(channels.to_vec()),
        (EncodedFormat::Bayer4, EncodedFormat::Bayer4) => Ok(channels.to_vec()),
        (EncodedFormat::Gray, EncodedFormat::Gray) => Ok(channels.to_vec()),
        (EncodedFormat::Yuv422, EncodedFormat::Rgb) | (EncodedFormat::Yuv422, EncodedFormat::Rgba) => {
            yuv_to_rgb_channels(channels, target_format == EncodedFormat::Rgba)
        }
        (EncodedFormat::Rgb, EncodedFormat::Yuv422) | (EncodedFormat::Rgba, EncodedFormat::Yuv422) => {
            rgb_to_yuv_channels(channels, out_format)
        }
        _ => Err(CineformError::BadFormat("no conversion exists between this sample's encoded format and the requested pixel format")),
    }
}

fn three(channels: &[Channel]) -> Result<[&Channel; 3]> {
    match channels {
        [a, b, c, ..] => Ok([a, b, c]),
        _ => Err(CineformError::BadFrame("expected at least 3 channels")),
    }
}

/// Unpackers store every wire format's raw samples at their native bit depth without rescaling
/// (`cineform_color::format`'s 8-bit packers store `0..=255`, its 16-bit packers store
/// `0..=65535`). Every concrete pixel format CineForm actually targets for a color-matrix
/// conversion is 8-bit per `cineform-color`'s packed formats (`Rg24`/`Bgr24`/`Rg32`/`Yuyv`/`Uyvy`),
/// so the fixed-point matrix runs at the 8-bit shift.
const MATRIX_SHIFT: u32 = 7;

/// Upsamples chroma to luma resolution, converts every pixel with [`ColorMatrix::Cg709`], and
/// emits full-resolution R/G/B(/A) channels.
fn yuv_to_rgb_channels(channels: &[Channel], with_alpha: bool) -> Result<Vec<Channel>> {
    let [y, cb, cr] = three(channels)?;
    let cb_full = resample_plane(cb, y.width, y.height);
    let cr_full = resample_plane(cr, y.width, y.height);
    let coeffs = ColorMatrix::Cg709.coefficients();

    let mut r = Channel { width: y.width, height: y.height, data: vec![0; y.width * y.height] };
    let mut g = r.clone();
    let mut b = r.clone();
    for i in 0..(y.width * y.height) {
        let (rv, gv, bv) =
            matrix::yuv_to_rgb(&coeffs, i32::from(y.data[i]), i32::from(cb_full.data[i]), i32::from(cr_full.data[i]), MATRIX_SHIFT);
        r.data[i] = rv;
        g.data[i] = gv;
        b.data[i] = bv;
    }

    let mut out = vec![r, g, b];
    if with_alpha {
        let opaque = cineform_color::alpha::encode(255) as i16;
        out.push(Channel { width: y.width, height: y.height, data: vec![opaque; y.width * y.height] });
    }
    Ok(out)
}

/// Converts full-resolution R/G/B(/A) channels to Y/Cb/Cr with [`ColorMatrix::Cg709`], then
/// subsamples chroma to whatever shape `out_format` expects.
fn rgb_to_yuv_channels(channels: &[Channel], out_format: PixelFormat) -> Result<Vec<Channel>> {
    let [r, g, b] = three(channels)?;
    let coeffs = ColorMatrix::Cg709.coefficients();

    let mut y = Channel { width: r.width, height: r.height, data: vec![0; r.width * r.height] };
    let mut cb = y.clone();
    let mut cr = y.clone();
    for i in 0..(r.width * r.height) {
        let (yv, cbv, crv) =
            matrix::rgb_to_yuv(&coeffs, i32::from(r.data[i]), i32::from(g.data[i]), i32::from(b.data[i]), MATRIX_SHIFT);
        y.data[i] = yv;
        cb.data[i] = cbv;
        cr.data[i] = crv;
    }

    let chroma_width = y.width.div_ceil(2);
    let chroma_height = if is_420(out_format) { y.height.div_ceil(2) } else { y.height };
    Ok(vec![y, resample_plane(&cb, chroma_width, chroma_height), resample_plane(&cr, chroma_width, chroma_height)])
}

/// Nearest-neighbor resamples `plane` to `(target_width, target_height)`. Exact when the ratio is
/// an integer, approximate otherwise.
fn resample_plane(plane: &Channel, target_width: usize, target_height: usize) -> Channel {
    if plane.width == target_width && plane.height == target_height {
        return plane.clone();
    }

    let mut out = Channel { width: target_width, height: target_height, data: vec![0; target_width * target_height] };
    for y in 0..target_height {
        let src_y = (y * plane.height.max(1)) / target_height.max(1);
        let src_y = src_y.min(plane.height.saturating_sub(1));
        for x in 0..target_width {
            let src_x = (x * plane.width.max(1)) / target_width.max(1);
            let src_x = src_x.min(plane.width.saturating_sub(1));
            out.data[y * target_width + x] = plane.data[src_y * plane.width + src_x];
        }
    }
    out
}

/// Mirrors the exact buffer-size arithmetic each `cineform_color::format` unpacker/packer checks,
/// so a decoded sample's output buffer is allocated at precisely the right size rather than
/// over-allocated and left partially unwritten.
fn packed_buffer_len(format: PixelFormat, width: usize, height: usize) -> Result<usize> {
    use PixelFormat::*;
    Ok(match format {
        Yuyv | Uyvy => width * height * 2,
        Yu64 => width * height * 2 * 2,
        Yr16 => {
            let chroma_width = width / 2;
            width * height * 2 + 2 * chroma_width * height * 2
        }
        V210 => {
            if width % 6 != 0 {
                return Err(CineformError::BadFormat("V210 width must be a multiple of 6"));
            }
            let words_per_row = (width / 6) * 4;
            words_per_row * 4 * height
        }
        Nv12 | Yv12 => {
            let chroma_width = width / 2;
            let chroma_height = height / 2;
            width * height + 2 * chroma_width * chroma_height
        }
        Rg24 | Bgr24 => width * height * 3,
        Rg32 => width * height * 4,
        Rg48 => width * height * 6,
        Rg64 | B64a => width * height * 8,
        Rg30 | Ar10 | R210 | Dpx0 => width * height * 4,
        Bayer { bits, .. } => {
            let sample_bytes = if bits > 8 { 2 } else { 1 };
            width * height * sample_bytes
        }
        R408 | V408 => width * height * 4,
        R4fl => width * height * 16,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::session::Session;

    fn solid_frame(value: u8, width: u32, height: u32) -> Frame {
        let data = vec![value; (width * height * 2) as usize];
        Frame::new(PixelFormat::Yuyv, width, height, height, data).unwrap()
    }

    #[test]
    fn keyframe_round_trips_through_encode_and_decode() {
        let mut session = Session::new(SessionConfig::new());
        let frame = solid_frame(128, 8, 4);
        let sample = session.encode(&frame).unwrap();

        let decoded = session.decode(&sample, PixelFormat::Yuyv).unwrap();
        assert_eq!(decoded.width, 8);
        assert_eq!(decoded.height, 4);
        assert_eq!(decoded.data.len(), frame.data.len());
    }

    #[test]
    fn difference_frame_without_keyframe_is_missing_reference() {
        let mut session = Session::new(SessionConfig::new());
        let frame = solid_frame(128, 8, 4).as_difference();
        let sample = crate::encode::encode_frame(&mut session, &frame);
        assert!(matches!(sample, Err(CineformError::MissingReference)));
    }

    #[test]
    fn decoding_to_a_different_chroma_shape_changes_buffer_size() {
        let mut session = Session::new(SessionConfig::new());
        let frame = solid_frame(128, 8, 4);
        let sample = session.encode(&frame).unwrap();

        let decoded = session.decode(&sample, PixelFormat::Nv12).unwrap();
        assert_eq!(decoded.data.len(), 8 * 4 + 2 * (8 / 2) * (4 / 2));
    }

    #[test]
    fn cross_family_decode_to_rgb_produces_expected_buffer_size() {
        let mut session = Session::new(SessionConfig::new());
        let frame = solid_frame(128, 8, 4);
        let sample = session.encode(&frame).unwrap();

        let decoded = session.decode(&sample, PixelFormat::Rg24).unwrap();
        assert_eq!(decoded.data.len(), 8 * 4 * 3);
    }

    #[test]
    fn resample_plane_is_identity_when_shape_matches() {
        let plane = Channel { width: 2, height: 2, data: vec![1, 2, 3, 4] };
        let resampled = resample_plane(&plane, 2, 2);
        assert_eq!(resampled.data, plane.data);
    }
}
