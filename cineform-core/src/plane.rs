// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! Pixel planes: a 2-D array of samples with an explicit pitch,
//! one dimension (frames) to two (rows/columns) and from audio sample types to the codec's
//! fixed integer sample kinds.

use crate::arena::Scope;
use crate::errors::{CineformError, Result};

/// The storage kind a plane's samples are interpreted as. Coefficients produced mid-transform are
/// always [`SampleKind::Signed16`]; source/output planes may be 8-bit unsigned (most packed pixel
/// formats) or 16-bit unsigned (the `YR16`/`RG48`-family high bit depth formats).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SampleKind {
    Unsigned8,
    Signed16,
    Unsigned16,
}

impl SampleKind {
    /// Size in bytes of one sample of this kind.
    pub fn sample_size(self) -> usize {
        match self {
            SampleKind::Unsigned8 => 1,
            SampleKind::Signed16 | SampleKind::Unsigned16 => 2,
        }
    }
}

/// A 2-D array of 16-bit-or-narrower samples with an explicit row pitch.
///
/// The backing storage is always borrowed from a session [`Scope`] — there is no owned variant —
/// planes are owned by the encode/decode session, never by
/// the caller.
pub struct PixelPlane<'a> {
    data: &'a mut [u8],
    width: u32,
    height: u32,
    pitch: usize,
    kind: SampleKind,
    scale: u8,
}

impl<'a> PixelPlane<'a> {
    /// Allocates a new plane of `width` x `height` samples of `kind` from `scope`, with its pitch
    /// rounded up to the next [`crate::arena::ALIGNMENT`]-byte boundary.
    pub fn alloc(
        scope: &mut Scope<'a>,
        width: u32,
        height: u32,
        kind: SampleKind,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CineformError::InvalidArgument("plane dimensions must be non-zero"));
        }

        let row_bytes = width as usize * kind.sample_size();
        let pitch = crate::arena::align_up_pub(row_bytes, crate::arena::ALIGNMENT);
        let total = pitch
            .checked_mul(height as usize)
            .ok_or(CineformError::InvalidArgument("plane too large"))?;

        let data = scope.alloc_aligned(total, crate::arena::ALIGNMENT)?;

        Ok(PixelPlane { data, width, height, pitch, kind, scale: 0 })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in bytes. Always ≥ `width * kind.sample_size()` and a multiple of
    /// [`crate::arena::ALIGNMENT`].
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    pub fn kind(&self) -> SampleKind {
        self.kind
    }

    /// Number of prescale right-shifts already baked into this plane's stored values.
    pub fn scale(&self) -> u8 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: u8) {
        self.scale = scale;
    }

    /// Raw bytes of row `row` (0-indexed), `width * kind.sample_size()` bytes long (not the full
    /// pitch — trailing alignment padding is excluded).
    pub fn row_bytes(&self, row: u32) -> &[u8] {
        let start = row as usize * self.pitch;
        let len = self.width as usize * self.kind.sample_size();
        &self.data[start..start + len]
    }

    pub fn row_bytes_mut(&mut self, row: u32) -> &mut [u8] {
        let start = row as usize * self.pitch;
        let len = self.width as usize * self.kind.sample_size();
        &mut self.data[start..start + len]
    }

    /// Row `row` reinterpreted as signed 16-bit samples. Panics if `kind() != Signed16`.
    pub fn row_i16(&self, row: u32) -> &[i16] {
        assert_eq!(self.kind, SampleKind::Signed16);
        bytemuck::cast_slice(self.row_bytes(row))
    }

    pub fn row_i16_mut(&mut self, row: u32) -> &mut [i16] {
        assert_eq!(self.kind, SampleKind::Signed16);
        bytemuck::cast_slice_mut(self.row_bytes_mut(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    #[test]
    fn alloc_rounds_pitch_to_alignment() {
        let mut arena = Arena::new(4096);
        let mut root = arena.root();
        let plane = PixelPlane::alloc(&mut root, 6, 4, SampleKind::Signed16).unwrap();
        // 6 samples * 2 bytes = 12, rounded up to 16.
        assert_eq!(plane.pitch(), 16);
    }

    #[test]
    fn row_i16_round_trips() {
        let mut arena = Arena::new(4096);
        let mut root = arena.root();
        let mut plane = PixelPlane::alloc(&mut root, 4, 2, SampleKind::Signed16).unwrap();
        plane.row_i16_mut(1).copy_from_slice(&[1, -2, 3, -4]);
        assert_eq!(plane.row_i16(1), &[1, -2, 3, -4]);
        assert_eq!(plane.row_i16(0), &[0, 0, 0, 0]);
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let mut arena = Arena::new(4096);
        let mut root = arena.root();
        assert!(matches!(
            PixelPlane::alloc(&mut root, 0, 4, SampleKind::Signed16),
            Err(CineformError::InvalidArgument(_))
        ));
    }
}
