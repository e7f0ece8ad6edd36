// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! Pixel format unpackers/packers: the
//! boundary between externally supplied raw buffers and the codec's internal per-channel `i16`
//! planes. Every unpacker has a matching packer so `cineform`'s decode path can hand back whatever
//! format the caller originally asked for.
//!
//! Like `cineform-wavelet`'s `transform::Grid`, these operate on owned buffers rather than
//! `cineform-core`'s arena-bound `PixelPlane` directly — the session orchestrator copies at the
//! arena boundary.

use cineform_core::errors::{CineformError, Result};

use crate::alpha;
use crate::bayer::{self, BayerOrientation, MosaicQuad};

/// One decoded channel: a plain row-major `i16` plane with its own width/height (distinct
/// channels of a 4:2:2 frame are not all the same size).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Channel {
    pub width: usize,
    pub height: usize,
    pub data: Vec<i16>,
}

impl Channel {
    fn new(width: usize, height: usize) -> Self {
        Channel { width, height, data: vec![0; width * height] }
    }

    #[inline]
    fn set(&mut self, x: usize, y: usize, value: i16) {
        self.data[y * self.width + x] = value;
    }

    #[inline]
    fn get(&self, x: usize, y: usize) -> i16 {
        self.data[y * self.width + x]
    }
}

/// The wire pixel-format tags.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Yuyv,
    Uyvy,
    Yu64,
    Yr16,
    V210,
    Nv12,
    Yv12,
    Rg24,
    Bgr24,
    Rg32,
    Rg48,
    Rg64,
    B64a,
    Rg30,
    Ar10,
    R210,
    Dpx0,
    Bayer { bits: u8, orientation: BayerOrientation },
    R408,
    V408,
    R4fl,
}

/// The packed byte size of one frame in `format` at `width`x`height`, for callers (tooling,
/// test fixtures) that need to size a raw buffer before calling [`unpack`]/[`pack`].
pub fn packed_size(format: PixelFormat, width: usize, height: usize) -> Result<usize> {
    require(width > 0 && height > 0, "frame dimensions must be non-zero")?;
    let size = match format {
        PixelFormat::Yuyv | PixelFormat::Uyvy => {
            require(width % 2 == 0, "4:2:2 width must be even")?;
            width * height * 2
        }
        PixelFormat::Yu64 => width * height * 6,
        PixelFormat::Yr16 => {
            require(width % 2 == 0, "4:2:2 width must be even")?;
            width * height * 2 + 2 * (width / 2) * height * 2
        }
        PixelFormat::V210 => {
            require(width % 6 == 0, "V210 width must be a multiple of 6")?;
            (width / 6) * 16 * height
        }
        PixelFormat::Nv12 | PixelFormat::Yv12 => {
            require(width % 2 == 0 && height % 2 == 0, "4:2:0 dimensions must be even")?;
            width * height + 2 * (width / 2) * (height / 2)
        }
        PixelFormat::Rg24 | PixelFormat::Bgr24 => width * height * 3,
        PixelFormat::Rg32 => width * height * 4,
        PixelFormat::Rg48 => width * height * 6,
        PixelFormat::Rg64 | PixelFormat::B64a => width * height * 8,
        PixelFormat::Rg30 | PixelFormat::Ar10 | PixelFormat::R210 | PixelFormat::Dpx0 => width * height * 4,
        PixelFormat::Bayer { .. } => width * height,
        PixelFormat::R408 | PixelFormat::V408 => width * height * 4,
        PixelFormat::R4fl => width * height * 16,
    };
    Ok(size)
}

fn require(condition: bool, msg: &'static str) -> Result<()> {
    if condition { Ok(()) } else { Err(CineformError::BadFormat(msg)) }
}

/// Unpacks a raw buffer of the given `format` into its channel planes.
pub fn unpack(format: PixelFormat, width: usize, height: usize, buf: &[u8]) -> Result<Vec<Channel>> {
    match format {
        PixelFormat::Yuyv => unpack_yuv422_u8(buf, width, height, [0, 1, 3]),
        PixelFormat::Uyvy => unpack_yuv422_u8(buf, width, height, [1, 0, 2]),
        PixelFormat::Yu64 => unpack_yuv422_u16(buf, width, height, [0, 1, 2]),
        PixelFormat::Yr16 => unpack_planar_422_u16(buf, width, height),
        PixelFormat::V210 => unpack_v210(buf, width, height),
        PixelFormat::Nv12 => unpack_nv12(buf, width, height, false),
        PixelFormat::Yv12 => unpack_yv12(buf, width, height),
        PixelFormat::Rg24 => unpack_rgb24(buf, width, height, [0, 1, 2]),
        PixelFormat::Bgr24 => unpack_rgb24(buf, width, height, [2, 1, 0]),
        PixelFormat::Rg32 => unpack_rgba32(buf, width, height),
        PixelFormat::Rg48 => unpack_rgb48(buf, width, height),
        PixelFormat::Rg64 => unpack_rgba64(buf, width, height, false),
        PixelFormat::B64a => unpack_rgba64(buf, width, height, true),
        PixelFormat::Rg30 => unpack_packed10(buf, width, height, Packed10Layout::Ab10),
        PixelFormat::Ar10 => unpack_packed10(buf, width, height, Packed10Layout::Ar10),
        PixelFormat::R210 => unpack_packed10(buf, width, height, Packed10Layout::R210),
        PixelFormat::Dpx0 => unpack_packed10(buf, width, height, Packed10Layout::Dpx0),
        PixelFormat::Bayer { bits, orientation } => unpack_bayer(buf, width, height, bits, orientation),
        PixelFormat::R408 => unpack_yuva8(buf, width, height, true),
        PixelFormat::V408 => unpack_yuva8(buf, width, height, false),
        PixelFormat::R4fl => unpack_yuva_f32(buf, width, height),
    }
}

/// Packs channel planes back into a raw buffer of the given `format`.
pub fn pack(format: PixelFormat, channels: &[Channel], out: &mut [u8]) -> Result<()> {
    match format {
        PixelFormat::Yuyv => pack_yuv422_u8(channels, out, [0, 1, 3]),
        PixelFormat::Uyvy => pack_yuv422_u8(channels, out, [1, 0, 2]),
        PixelFormat::Yu64 => pack_yuv422_u16(channels, out, [0, 1, 2]),
        PixelFormat::Yr16 => pack_planar_422_u16(channels, out),
        PixelFormat::V210 => pack_v210(channels, out),
        PixelFormat::Nv12 => pack_nv12(channels, out),
        PixelFormat::Yv12 => pack_yv12(channels, out),
        PixelFormat::Rg24 => pack_rgb24(channels, out, [0, 1, 2]),
        PixelFormat::Bgr24 => pack_rgb24(channels, out, [2, 1, 0]),
        PixelFormat::Rg32 => pack_rgba32(channels, out),
        PixelFormat::Rg48 => pack_rgb48(channels, out),
        PixelFormat::Rg64 => pack_rgba64(channels, out, false),
        PixelFormat::B64a => pack_rgba64(channels, out, true),
        PixelFormat::Rg30 => pack_packed10(channels, out, Packed10Layout::Ab10),
        PixelFormat::Ar10 => pack_packed10(channels, out, Packed10Layout::Ar10),
        PixelFormat::R210 => pack_packed10(channels, out, Packed10Layout::R210),
        PixelFormat::Dpx0 => pack_packed10(channels, out, Packed10Layout::Dpx0),
        PixelFormat::Bayer { bits, orientation } => pack_bayer(channels, out, bits, orientation),
        PixelFormat::R408 => pack_yuva8(channels, out, true),
        PixelFormat::V408 => pack_yuva8(channels, out, false),
        PixelFormat::R4fl => pack_yuva_f32(channels, out),
    }
}

// ---- 8-bit interleaved 4:2:2 (YUYV/UYVY) -----------------------------------------------------

/// `order` gives the byte offsets of `[y_even, chroma0, y_odd]` within each 4-byte macropixel
/// (the second chroma sample always follows at `+2` from the first).
fn unpack_yuv422_u8(buf: &[u8], width: usize, height: usize, order: [usize; 3]) -> Result<Vec<Channel>> {
    require(width % 2 == 0, "4:2:2 width must be even")?;
    let row_bytes = width * 2;
    require(buf.len() >= row_bytes * height, "buffer shorter than declared dimensions")?;

    let mut y = Channel::new(width, height);
    let mut cb = Channel::new(width / 2, height);
    let mut cr = Channel::new(width / 2, height);

    for row in 0..height {
        let line = &buf[row * row_bytes..(row + 1) * row_bytes];
        for pair in 0..(width / 2) {
            let m = &line[pair * 4..pair * 4 + 4];
            y.set(pair * 2, row, i16::from(m[order[0]]));
            y.set(pair * 2 + 1, row, i16::from(m[order[2]]));
            cb.set(pair, row, i16::from(m[order[1]]));
            cr.set(pair, row, i16::from(m[order[1] + 2]));
        }
    }
    Ok(vec![y, cb, cr])
}

fn pack_yuv422_u8(channels: &[Channel], out: &mut [u8], order: [usize; 3]) -> Result<()> {
    let (y, cb, cr) = three(channels)?;
    let row_bytes = y.width * 2;
    require(out.len() >= row_bytes * y.height, "output buffer too small")?;

    for row in 0..y.height {
        let line = &mut out[row * row_bytes..(row + 1) * row_bytes];
        for pair in 0..(y.width / 2) {
            let m = &mut line[pair * 4..pair * 4 + 4];
            m[order[0]] = clamp_u8(y.get(pair * 2, row));
            m[order[2]] = clamp_u8(y.get(pair * 2 + 1, row));
            m[order[1]] = clamp_u8(cb.get(pair, row));
            m[order[1] + 2] = clamp_u8(cr.get(pair, row));
        }
    }
    Ok(())
}

// ---- 16-bit interleaved 4:2:2 (YU64) ---------------------------------------------------------

fn unpack_yuv422_u16(buf: &[u8], width: usize, height: usize, order: [usize; 3]) -> Result<Vec<Channel>> {
    require(width % 2 == 0, "4:2:2 width must be even")?;
    let row_bytes = width * 2 * 2;
    require(buf.len() >= row_bytes * height, "buffer shorter than declared dimensions")?;

    let mut y = Channel::new(width, height);
    let mut cb = Channel::new(width / 2, height);
    let mut cr = Channel::new(width / 2, height);

    for row in 0..height {
        let line = &buf[row * row_bytes..(row + 1) * row_bytes];
        for pair in 0..(width / 2) {
            let read = |idx: usize| -> i16 {
                let o = idx * 2;
                u16::from_le_bytes([line[pair * 6 + o], line[pair * 6 + o + 1]]) as i16
            };
            y.set(pair * 2, row, read(order[0]));
            cb.set(pair, row, read(order[1]));
            y.set(pair * 2 + 1, row, read(order[2]));
            cr.set(pair, row, read(order[1] + 3));
        }
    }
    Ok(vec![y, cb, cr])
}

fn pack_yuv422_u16(channels: &[Channel], out: &mut [u8], order: [usize; 3]) -> Result<()> {
    let (y, cb, cr) = three(channels)?;
    let row_bytes = y.width * 2 * 2;
    require(out.len() >= row_bytes * y.height, "output buffer too small")?;

    for row in 0..y.height {
        let line = &mut out[row * row_bytes..(row + 1) * row_bytes];
        for pair in 0..(y.width / 2) {
            let mut write = |idx: usize, value: i16| {
                let o = idx * 2;
                line[pair * 6 + o..pair * 6 + o + 2].copy_from_slice(&(value as u16).to_le_bytes());
            };
            write(order[0], y.get(pair * 2, row));
            write(order[1], cb.get(pair, row));
            write(order[2], y.get(pair * 2 + 1, row));
            write(order[1] + 3, cr.get(pair, row));
        }
    }
    Ok(())
}

// ---- planar 16-bit 4:2:2 (YR16) --------------------------------------------------------------

fn unpack_planar_422_u16(buf: &[u8], width: usize, height: usize) -> Result<Vec<Channel>> {
    require(width % 2 == 0, "4:2:2 width must be even")?;
    let chroma_width = width / 2;
    let y_bytes = width * height * 2;
    let c_bytes = chroma_width * height * 2;
    require(buf.len() >= y_bytes + 2 * c_bytes, "buffer shorter than declared dimensions")?;

    let y = read_plane_u16(&buf[..y_bytes], width, height);
    let cb = read_plane_u16(&buf[y_bytes..y_bytes + c_bytes], chroma_width, height);
    let cr = read_plane_u16(&buf[y_bytes + c_bytes..y_bytes + 2 * c_bytes], chroma_width, height);
    Ok(vec![y, cb, cr])
}

fn pack_planar_422_u16(channels: &[Channel], out: &mut [u8]) -> Result<()> {
    let (y, cb, cr) = three(channels)?;
    let y_bytes = y.width * y.height * 2;
    let c_bytes = cb.width * cb.height * 2;
    require(out.len() >= y_bytes + 2 * c_bytes, "output buffer too small")?;

    write_plane_u16(y, &mut out[..y_bytes]);
    write_plane_u16(cb, &mut out[y_bytes..y_bytes + c_bytes]);
    write_plane_u16(cr, &mut out[y_bytes + c_bytes..y_bytes + 2 * c_bytes]);
    Ok(())
}

fn read_plane_u16(buf: &[u8], width: usize, height: usize) -> Channel {
    let mut plane = Channel::new(width, height);
    for (i, v) in plane.data.iter_mut().enumerate() {
        *v = u16::from_le_bytes([buf[i * 2], buf[i * 2 + 1]]) as i16;
    }
    plane
}

fn write_plane_u16(plane: &Channel, out: &mut [u8]) {
    for (i, &v) in plane.data.iter().enumerate() {
        out[i * 2..i * 2 + 2].copy_from_slice(&(v as u16).to_le_bytes());
    }
}

// ---- V210 ---------------------------------------------------------------------------------

/// 6 pixels packed into 4 little-endian 32-bit words.
fn unpack_v210(buf: &[u8], width: usize, height: usize) -> Result<Vec<Channel>> {
    require(width % 6 == 0, "V210 width must be a multiple of 6")?;
    let words_per_row = (width / 6) * 4;
    let row_bytes = words_per_row * 4;
    require(buf.len() >= row_bytes * height, "buffer shorter than declared dimensions")?;

    let mut y = Channel::new(width, height);
    let mut cb = Channel::new(width / 2, height);
    let mut cr = Channel::new(width / 2, height);

    for row in 0..height {
        let line = &buf[row * row_bytes..(row + 1) * row_bytes];
        for group in 0..(width / 6) {
            let words: Vec<u32> = (0..4)
                .map(|w| {
                    let o = group * 16 + w * 4;
                    u32::from_le_bytes([line[o], line[o + 1], line[o + 2], line[o + 3]])
                })
                .collect();

            let field = |word: u32, shift: u32| -> i16 { ((word >> shift) & 0x3ff) as i16 };

            let cb0 = field(words[0], 0);
            let y0 = field(words[0], 10);
            let cr0 = field(words[0], 20);
            let y1 = field(words[1], 0);
            let cb1 = field(words[1], 10);
            let y2 = field(words[1], 20);
            let cr1 = field(words[2], 0);
            let y3 = field(words[2], 10);
            let cb2 = field(words[2], 20);
            let y4 = field(words[3], 0);
            let cr2 = field(words[3], 10);
            let y5 = field(words[3], 20);

            let base = group * 6;
            for (i, value) in [y0, y1, y2, y3, y4, y5].into_iter().enumerate() {
                y.set(base + i, row, value);
            }
            let cbase = group * 3;
            for (i, value) in [cb0, cb1, cb2].into_iter().enumerate() {
                cb.set(cbase + i, row, value);
            }
            for (i, value) in [cr0, cr1, cr2].into_iter().enumerate() {
                cr.set(cbase + i, row, value);
            }
        }
    }
    Ok(vec![y, cb, cr])
}

fn pack_v210(channels: &[Channel], out: &mut [u8]) -> Result<()> {
    let (y, cb, cr) = three(channels)?;
    require(y.width % 6 == 0, "V210 width must be a multiple of 6")?;
    let words_per_row = (y.width / 6) * 4;
    let row_bytes = words_per_row * 4;
    require(out.len() >= row_bytes * y.height, "output buffer too small")?;

    for row in 0..y.height {
        let line = &mut out[row * row_bytes..(row + 1) * row_bytes];
        for group in 0..(y.width / 6) {
            let base = group * 6;
            let cbase = group * 3;
            let g10 = |v: i16| -> u32 { (v as u32) & 0x3ff };

            let word0 = g10(cb.get(cbase, row)) | (g10(y.get(base, row)) << 10) | (g10(cr.get(cbase, row)) << 20);
            let word1 = g10(y.get(base + 1, row)) | (g10(cb.get(cbase + 1, row)) << 10) | (g10(y.get(base + 2, row)) << 20);
            let word2 = g10(cr.get(cbase + 1, row)) | (g10(y.get(base + 3, row)) << 10) | (g10(cb.get(cbase + 2, row)) << 20);
            let word3 = g10(y.get(base + 4, row)) | (g10(cr.get(cbase + 2, row)) << 10) | (g10(y.get(base + 5, row)) << 20);

            for (i, word) in [word0, word1, word2, word3].into_iter().enumerate() {
                let o = group * 16 + i * 4;
                line[o..o + 4].copy_from_slice(&word.to_le_bytes());
            }
        }
    }
    Ok(())
}

// ---- 4:2:0 (NV12/YV12) -----------------------------------------------------------------------

fn unpack_nv12(buf: &[u8], width: usize, height: usize, swap_uv: bool) -> Result<Vec<Channel>> {
    require(width % 2 == 0 && height % 2 == 0, "4:2:0 dimensions must be even")?;
    let chroma_width = width / 2;
    let chroma_height = height / 2;
    let y_bytes = width * height;
    let uv_bytes = chroma_width * chroma_height * 2;
    require(buf.len() >= y_bytes + uv_bytes, "buffer shorter than declared dimensions")?;

    let mut y = Channel::new(width, height);
    y.data.iter_mut().zip(&buf[..y_bytes]).for_each(|(dst, &src)| *dst = i16::from(src));

    let mut cb = Channel::new(chroma_width, chroma_height);
    let mut cr = Channel::new(chroma_width, chroma_height);
    let uv = &buf[y_bytes..y_bytes + uv_bytes];
    for i in 0..(chroma_width * chroma_height) {
        let (u, v) = (uv[i * 2], uv[i * 2 + 1]);
        let (u, v) = if swap_uv { (v, u) } else { (u, v) };
        cb.data[i] = i16::from(u);
        cr.data[i] = i16::from(v);
    }
    Ok(vec![y, cb, cr])
}

fn pack_nv12(channels: &[Channel], out: &mut [u8]) -> Result<()> {
    let (y, cb, cr) = three(channels)?;
    let y_bytes = y.width * y.height;
    let uv_bytes = cb.width * cb.height * 2;
    require(out.len() >= y_bytes + uv_bytes, "output buffer too small")?;

    for (dst, &src) in out[..y_bytes].iter_mut().zip(&y.data) {
        *dst = clamp_u8(src);
    }
    let uv = &mut out[y_bytes..y_bytes + uv_bytes];
    for i in 0..(cb.width * cb.height) {
        uv[i * 2] = clamp_u8(cb.data[i]);
        uv[i * 2 + 1] = clamp_u8(cr.data[i]);
    }
    Ok(())
}

fn unpack_yv12(buf: &[u8], width: usize, height: usize) -> Result<Vec<Channel>> {
    require(width % 2 == 0 && height % 2 == 0, "4:2:0 dimensions must be even")?;
    let chroma_width = width / 2;
    let chroma_height = height / 2;
    let y_bytes = width * height;
    let c_bytes = chroma_width * chroma_height;
    require(buf.len() >= y_bytes + 2 * c_bytes, "buffer shorter than declared dimensions")?;

    let y = read_plane_u8(&buf[..y_bytes], width, height);
    let cr = read_plane_u8(&buf[y_bytes..y_bytes + c_bytes], chroma_width, chroma_height);
    let cb = read_plane_u8(&buf[y_bytes + c_bytes..y_bytes + 2 * c_bytes], chroma_width, chroma_height);
    Ok(vec![y, cb, cr])
}

fn pack_yv12(channels: &[Channel], out: &mut [u8]) -> Result<()> {
    let (y, cb, cr) = three(channels)?;
    let y_bytes = y.width * y.height;
    let c_bytes = cb.width * cb.height;
    require(out.len() >= y_bytes + 2 * c_bytes, "output buffer too small")?;

    write_plane_u8(y, &mut out[..y_bytes]);
    write_plane_u8(cr, &mut out[y_bytes..y_bytes + c_bytes]);
    write_plane_u8(cb, &mut out[y_bytes + c_bytes..y_bytes + 2 * c_bytes]);
    Ok(())
}

fn read_plane_u8(buf: &[u8], width: usize, height: usize) -> Channel {
    let mut plane = Channel::new(width, height);
    for (dst, &src) in plane.data.iter_mut().zip(buf) {
        *dst = i16::from(src);
    }
    plane
}

fn write_plane_u8(plane: &Channel, out: &mut [u8]) {
    for (dst, &src) in out.iter_mut().zip(&plane.data) {
        *dst = clamp_u8(src);
    }
}

// ---- packed 8-bit RGB(A) ----------------------------------------------------------------------

fn unpack_rgb24(buf: &[u8], width: usize, height: usize, order: [usize; 3]) -> Result<Vec<Channel>> {
    require(buf.len() >= width * height * 3, "buffer shorter than declared dimensions")?;
    let mut r = Channel::new(width, height);
    let mut g = Channel::new(width, height);
    let mut b = Channel::new(width, height);
    for i in 0..(width * height) {
        let px = &buf[i * 3..i * 3 + 3];
        r.data[i] = i16::from(px[order[0]]);
        g.data[i] = i16::from(px[order[1]]);
        b.data[i] = i16::from(px[order[2]]);
    }
    Ok(vec![r, g, b])
}

fn pack_rgb24(channels: &[Channel], out: &mut [u8], order: [usize; 3]) -> Result<()> {
    let (r, g, b) = three(channels)?;
    require(out.len() >= r.width * r.height * 3, "output buffer too small")?;
    for i in 0..(r.width * r.height) {
        let px = &mut out[i * 3..i * 3 + 3];
        px[order[0]] = clamp_u8(r.data[i]);
        px[order[1]] = clamp_u8(g.data[i]);
        px[order[2]] = clamp_u8(b.data[i]);
    }
    Ok(())
}

fn unpack_rgba32(buf: &[u8], width: usize, height: usize) -> Result<Vec<Channel>> {
    require(buf.len() >= width * height * 4, "buffer shorter than declared dimensions")?;
    let mut r = Channel::new(width, height);
    let mut g = Channel::new(width, height);
    let mut b = Channel::new(width, height);
    let mut a = Channel::new(width, height);
    for i in 0..(width * height) {
        let px = &buf[i * 4..i * 4 + 4];
        r.data[i] = i16::from(px[0]);
        g.data[i] = i16::from(px[1]);
        b.data[i] = i16::from(px[2]);
        a.data[i] = alpha::encode(px[3]) as i16;
    }
    Ok(vec![r, g, b, a])
}

fn pack_rgba32(channels: &[Channel], out: &mut [u8]) -> Result<()> {
    let (r, g, b, a) = four(channels)?;
    require(out.len() >= r.width * r.height * 4, "output buffer too small")?;
    for i in 0..(r.width * r.height) {
        let px = &mut out[i * 4..i * 4 + 4];
        px[0] = clamp_u8(r.data[i]);
        px[1] = clamp_u8(g.data[i]);
        px[2] = clamp_u8(b.data[i]);
        px[3] = alpha::decode(a.data[i].max(0) as u16);
    }
    Ok(())
}

// ---- packed 16-bit RGB(A) ----------------------------------------------------------------------

fn unpack_rgb48(buf: &[u8], width: usize, height: usize) -> Result<Vec<Channel>> {
    require(buf.len() >= width * height * 6, "buffer shorter than declared dimensions")?;
    let mut r = Channel::new(width, height);
    let mut g = Channel::new(width, height);
    let mut b = Channel::new(width, height);
    for i in 0..(width * height) {
        let o = i * 6;
        r.data[i] = u16::from_le_bytes([buf[o], buf[o + 1]]) as i16;
        g.data[i] = u16::from_le_bytes([buf[o + 2], buf[o + 3]]) as i16;
        b.data[i] = u16::from_le_bytes([buf[o + 4], buf[o + 5]]) as i16;
    }
    Ok(vec![r, g, b])
}

fn pack_rgb48(channels: &[Channel], out: &mut [u8]) -> Result<()> {
    let (r, g, b) = three(channels)?;
    require(out.len() >= r.width * r.height * 6, "output buffer too small")?;
    for i in 0..(r.width * r.height) {
        let o = i * 6;
        out[o..o + 2].copy_from_slice(&(r.data[i] as u16).to_le_bytes());
        out[o + 2..o + 4].copy_from_slice(&(g.data[i] as u16).to_le_bytes());
        out[o + 4..o + 6].copy_from_slice(&(b.data[i] as u16).to_le_bytes());
    }
    Ok(())
}

/// `RG64`/`RGBA64` are little-endian `R,G,B,A`; `b64a` is big-endian QuickTime `A,R,G,B`
///.
fn unpack_rgba64(buf: &[u8], width: usize, height: usize, b64a: bool) -> Result<Vec<Channel>> {
    require(buf.len() >= width * height * 8, "buffer shorter than declared dimensions")?;
    let mut r = Channel::new(width, height);
    let mut g = Channel::new(width, height);
    let mut b = Channel::new(width, height);
    let mut a = Channel::new(width, height);
    for i in 0..(width * height) {
        let o = i * 8;
        let read = |idx: usize| -> u16 {
            let bytes = [buf[o + idx * 2], buf[o + idx * 2 + 1]];
            if b64a { u16::from_be_bytes(bytes) } else { u16::from_le_bytes(bytes) }
        };
        if b64a {
            a.data[i] = read(0) as i16;
            r.data[i] = read(1) as i16;
            g.data[i] = read(2) as i16;
            b.data[i] = read(3) as i16;
        } else {
            r.data[i] = read(0) as i16;
            g.data[i] = read(1) as i16;
            b.data[i] = read(2) as i16;
            a.data[i] = read(3) as i16;
        }
    }
    Ok(vec![r, g, b, a])
}

fn pack_rgba64(channels: &[Channel], out: &mut [u8], b64a: bool) -> Result<()> {
    let (r, g, b, a) = four(channels)?;
    require(out.len() >= r.width * r.height * 8, "output buffer too small")?;
    for i in 0..(r.width * r.height) {
        let o = i * 8;
        let mut write = |idx: usize, value: i16| {
            let bytes = if b64a { (value as u16).to_be_bytes() } else { (value as u16).to_le_bytes() };
            out[o + idx * 2..o + idx * 2 + 2].copy_from_slice(&bytes);
        };
        if b64a {
            write(0, a.data[i]);
            write(1, r.data[i]);
            write(2, g.data[i]);
            write(3, b.data[i]);
        } else {
            write(0, r.data[i]);
            write(1, g.data[i]);
            write(2, b.data[i]);
            write(3, a.data[i]);
        }
    }
    Ok(())
}

// ---- 10-bit packed RGB families (RG30/AR10/R210/DPX0) ------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Packed10Layout {
    /// `A2B10G10R10`, little-endian word.
    Ab10,
    /// `A2R10G10B10`, little-endian word.
    Ar10,
    /// `R10G10B10A2`, byte-swapped (big-endian word).
    R210,
    /// `R10G10B10` with 2-bit zero pad at the low end, byte-swapped.
    Dpx0,
}

fn unpack_packed10(buf: &[u8], width: usize, height: usize, layout: Packed10Layout) -> Result<Vec<Channel>> {
    require(buf.len() >= width * height * 4, "buffer shorter than declared dimensions")?;
    let mut r = Channel::new(width, height);
    let mut g = Channel::new(width, height);
    let mut b = Channel::new(width, height);

    for i in 0..(width * height) {
        let o = i * 4;
        let bytes = [buf[o], buf[o + 1], buf[o + 2], buf[o + 3]];
        let word = match layout {
            Packed10Layout::Ab10 | Packed10Layout::Ar10 => u32::from_le_bytes(bytes),
            Packed10Layout::R210 | Packed10Layout::Dpx0 => u32::from_be_bytes(bytes),
        };
        let (rv, gv, bv) = match layout {
            Packed10Layout::Ab10 => (word & 0x3ff, (word >> 10) & 0x3ff, (word >> 20) & 0x3ff),
            Packed10Layout::Ar10 => ((word >> 20) & 0x3ff, (word >> 10) & 0x3ff, word & 0x3ff),
            Packed10Layout::R210 => ((word >> 22) & 0x3ff, (word >> 12) & 0x3ff, (word >> 2) & 0x3ff),
            Packed10Layout::Dpx0 => ((word >> 22) & 0x3ff, (word >> 12) & 0x3ff, (word >> 2) & 0x3ff),
        };
        r.data[i] = rv as i16;
        g.data[i] = gv as i16;
        b.data[i] = bv as i16;
    }
    Ok(vec![r, g, b])
}

fn pack_packed10(channels: &[Channel], out: &mut [u8], layout: Packed10Layout) -> Result<()> {
    let (r, g, b) = three(channels)?;
    require(out.len() >= r.width * r.height * 4, "output buffer too small")?;

    for i in 0..(r.width * r.height) {
        let rv = (r.data[i] as u32) & 0x3ff;
        let gv = (g.data[i] as u32) & 0x3ff;
        let bv = (b.data[i] as u32) & 0x3ff;
        let word = match layout {
            Packed10Layout::Ab10 => rv | (gv << 10) | (bv << 20),
            Packed10Layout::Ar10 => bv | (gv << 10) | (rv << 20),
            Packed10Layout::R210 | Packed10Layout::Dpx0 => (rv << 22) | (gv << 12) | (bv << 2),
        };
        let bytes = match layout {
            Packed10Layout::Ab10 | Packed10Layout::Ar10 => word.to_le_bytes(),
            Packed10Layout::R210 | Packed10Layout::Dpx0 => word.to_be_bytes(),
        };
        out[i * 4..i * 4 + 4].copy_from_slice(&bytes);
    }
    Ok(())
}

// ---- Bayer mosaics (BYR1-5) --------------------------------------------------------------------

fn bytes_per_sample(bits: u8) -> usize {
    if bits > 8 { 2 } else { 1 }
}

fn unpack_bayer(buf: &[u8], width: usize, height: usize, bits: u8, orientation: BayerOrientation) -> Result<Vec<Channel>> {
    require(width % 2 == 0 && height % 2 == 0, "Bayer dimensions must be even")?;
    let sample_bytes = bytes_per_sample(bits);
    let row_bytes = width * sample_bytes;
    require(buf.len() >= row_bytes * height, "buffer shorter than declared dimensions")?;

    let quad_w = width / 2;
    let quad_h = height / 2;
    let mid = 1 << (bits + 1);
    let mut g = Channel::new(quad_w, quad_h);
    let mut delta_g = Channel::new(quad_w, quad_h);
    let mut rg = Channel::new(quad_w, quad_h);
    let mut bg = Channel::new(quad_w, quad_h);

    let sample_at = |x: usize, y: usize| -> u16 {
        let row = &buf[y * row_bytes..(y + 1) * row_bytes];
        if sample_bytes == 2 {
            u16::from_le_bytes([row[x * 2], row[x * 2 + 1]])
        } else {
            u16::from(row[x])
        }
    };

    for qy in 0..quad_h {
        for qx in 0..quad_w {
            let quad = MosaicQuad {
                top_left: sample_at(qx * 2, qy * 2),
                top_right: sample_at(qx * 2 + 1, qy * 2),
                bottom_left: sample_at(qx * 2, qy * 2 + 1),
                bottom_right: sample_at(qx * 2 + 1, qy * 2 + 1),
            };
            let q = bayer::unpack_quad(orientation, quad, mid);
            g.set(qx, qy, q.g as i16);
            delta_g.set(qx, qy, q.delta_g as i16);
            rg.set(qx, qy, q.rg as i16);
            bg.set(qx, qy, q.bg as i16);
        }
    }
    Ok(vec![g, rg, bg, delta_g])
}

fn pack_bayer(channels: &[Channel], out: &mut [u8], bits: u8, orientation: BayerOrientation) -> Result<()> {
    let (g, rg, bg, delta_g) = four(channels)?;
    let sample_bytes = bytes_per_sample(bits);
    let quad_w = g.width;
    let quad_h = g.height;
    let width = quad_w * 2;
    let row_bytes = width * sample_bytes;
    require(out.len() >= row_bytes * quad_h * 2, "output buffer too small")?;
    let mid = 1 << (bits + 1);

    let mut write = |x: usize, y: usize, value: u16, out: &mut [u8]| {
        let row = &mut out[y * row_bytes..(y + 1) * row_bytes];
        if sample_bytes == 2 {
            row[x * 2..x * 2 + 2].copy_from_slice(&value.to_le_bytes());
        } else {
            row[x] = value as u8;
        }
    };

    for qy in 0..quad_h {
        for qx in 0..quad_w {
            let q = bayer::Quadrature {
                g: i32::from(g.get(qx, qy)),
                delta_g: i32::from(delta_g.get(qx, qy)),
                rg: i32::from(rg.get(qx, qy)),
                bg: i32::from(bg.get(qx, qy)),
            };
            let quad = bayer::pack_quad(orientation, q, mid);
            write(qx * 2, qy * 2, quad.top_left, out);
            write(qx * 2 + 1, qy * 2, quad.top_right, out);
            write(qx * 2, qy * 2 + 1, quad.bottom_left, out);
            write(qx * 2 + 1, qy * 2 + 1, quad.bottom_right, out);
        }
    }
    Ok(())
}

// ---- YUVA (r408/v408/r4fl) ----------------------------------------------------------------------

/// `r408` stores `[V,Y,U,A]` per pixel; `v408` stores `[U,Y,V,A]` (both 4:4:4, 8-bit).
fn unpack_yuva8(buf: &[u8], width: usize, height: usize, r408: bool) -> Result<Vec<Channel>> {
    require(buf.len() >= width * height * 4, "buffer shorter than declared dimensions")?;
    let mut y = Channel::new(width, height);
    let mut cb = Channel::new(width, height);
    let mut cr = Channel::new(width, height);
    let mut a = Channel::new(width, height);
    for i in 0..(width * height) {
        let px = &buf[i * 4..i * 4 + 4];
        let (v_idx, y_idx, u_idx, a_idx) = if r408 { (0, 1, 2, 3) } else { (2, 1, 0, 3) };
        y.data[i] = i16::from(px[y_idx]);
        cb.data[i] = i16::from(px[u_idx]);
        cr.data[i] = i16::from(px[v_idx]);
        a.data[i] = alpha::encode(px[a_idx]) as i16;
    }
    Ok(vec![y, cb, cr, a])
}

fn pack_yuva8(channels: &[Channel], out: &mut [u8], r408: bool) -> Result<()> {
    let (y, cb, cr, a) = four(channels)?;
    require(out.len() >= y.width * y.height * 4, "output buffer too small")?;
    for i in 0..(y.width * y.height) {
        let px = &mut out[i * 4..i * 4 + 4];
        let (v_idx, y_idx, u_idx, a_idx) = if r408 { (0, 1, 2, 3) } else { (2, 1, 0, 3) };
        px[y_idx] = clamp_u8(y.data[i]);
        px[u_idx] = clamp_u8(cb.data[i]);
        px[v_idx] = clamp_u8(cr.data[i]);
        px[a_idx] = alpha::decode(a.data[i].max(0) as u16);
    }
    Ok(())
}

/// `r4fl`: `[Y,U,V,A]` 32-bit IEEE float, full range `[0, 1]`, rescaled to the internal 12-bit
/// companded domain the way the fixed-point unpackers populate their channels.
fn unpack_yuva_f32(buf: &[u8], width: usize, height: usize) -> Result<Vec<Channel>> {
    require(buf.len() >= width * height * 16, "buffer shorter than declared dimensions")?;
    let mut y = Channel::new(width, height);
    let mut cb = Channel::new(width, height);
    let mut cr = Channel::new(width, height);
    let mut a = Channel::new(width, height);
    for i in 0..(width * height) {
        let read = |idx: usize| -> f32 {
            let o = i * 16 + idx * 4;
            f32::from_le_bytes([buf[o], buf[o + 1], buf[o + 2], buf[o + 3]])
        };
        y.data[i] = f32_to_12bit(read(0));
        cb.data[i] = f32_to_12bit(read(1));
        cr.data[i] = f32_to_12bit(read(2));
        a.data[i] = f32_to_12bit(read(3));
    }
    Ok(vec![y, cb, cr, a])
}

fn pack_yuva_f32(channels: &[Channel], out: &mut [u8]) -> Result<()> {
    let (y, cb, cr, a) = four(channels)?;
    require(out.len() >= y.width * y.height * 16, "output buffer too small")?;
    for i in 0..(y.width * y.height) {
        let values = [twelve_bit_to_f32(y.data[i]), twelve_bit_to_f32(cb.data[i]), twelve_bit_to_f32(cr.data[i]), twelve_bit_to_f32(a.data[i])];
        for (idx, value) in values.into_iter().enumerate() {
            let o = i * 16 + idx * 4;
            out[o..o + 4].copy_from_slice(&value.to_le_bytes());
        }
    }
    Ok(())
}

fn f32_to_12bit(value: f32) -> i16 {
    (value.clamp(0.0, 1.0) * 4095.0).round() as i16
}

fn twelve_bit_to_f32(value: i16) -> f32 {
    f32::from(value.clamp(0, 4095)) / 4095.0
}

// ---- shared helpers ------------------------------------------------------------------------

fn clamp_u8(value: i16) -> u8 {
    value.clamp(0, 255) as u8
}

fn three(channels: &[Channel]) -> Result<(&Channel, &Channel, &Channel)> {
    match channels {
        [a, b, c, ..] => Ok((a, b, c)),
        _ => Err(CineformError::BadFrame("expected at least 3 channels")),
    }
}

fn four(channels: &[Channel]) -> Result<(&Channel, &Channel, &Channel, &Channel)> {
    match channels {
        [a, b, c, d, ..] => Ok((a, b, c, d)),
        _ => Err(CineformError::BadFrame("expected at least 4 channels")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yuyv_gray_round_trips_exactly() {
        let width = 4;
        let height = 2;
        let mut buf = vec![128u8; width * height * 2];
        for chunk in buf.chunks_mut(4) {
            chunk.copy_from_slice(&[128, 128, 128, 128]);
        }
        let channels = unpack(PixelFormat::Yuyv, width, height, &buf).unwrap();
        assert_eq!(channels[0].data, vec![128i16; width * height]);

        let mut out = vec![0u8; buf.len()];
        pack(PixelFormat::Yuyv, &channels, &mut out).unwrap();
        assert_eq!(out, buf);
    }

    #[test]
    fn v210_word0_matches_six_pixel_layout() {
        // Y=[64,128,192,256,320,384], Cb=[100,200,300], Cr=[150,250,350].
        let width = 6;
        let height = 1;
        let mut g = Channel::new(width, height);
        g.data = vec![64, 128, 192, 256, 320, 384];
        let mut cb = Channel::new(width / 2, height);
        cb.data = vec![100, 200, 300];
        let mut cr = Channel::new(width / 2, height);
        cr.data = vec![150, 250, 350];

        let mut out = vec![0u8; 16];
        pack_v210(&[g.clone(), cb.clone(), cr.clone()], &mut out).unwrap();
        let word0 = u32::from_le_bytes([out[0], out[1], out[2], out[3]]);
        let expected = 100u32 | (64u32 << 10) | (150u32 << 20);
        assert_eq!(word0, expected);

        let decoded = unpack_v210(&out, width, height).unwrap();
        assert_eq!(decoded[0].data, g.data);
        assert_eq!(decoded[1].data, cb.data);
        assert_eq!(decoded[2].data, cr.data);
    }

    #[test]
    fn rgba32_alpha_round_trips_through_companding() {
        let width = 2;
        let height = 1;
        let buf = vec![10, 20, 30, 0, 200, 210, 220, 255];
        let channels = unpack(PixelFormat::Rg32, width, height, &buf).unwrap();
        let mut out = vec![0u8; buf.len()];
        pack(PixelFormat::Rg32, &channels, &mut out).unwrap();
        assert_eq!(out[3], 0);
        assert_eq!(out[7], 255);
    }

    #[test]
    fn nv12_and_yv12_share_luma() {
        let width = 4;
        let height = 2;
        let mut buf = vec![0u8; width * height + (width / 2) * (height / 2) * 2];
        for (i, b) in buf.iter_mut().enumerate() {
            *b = (i % 200) as u8;
        }
        let channels = unpack(PixelFormat::Nv12, width, height, &buf).unwrap();
        assert_eq!(channels[0].width, width);
        assert_eq!(channels[1].width, width / 2);
    }
}
