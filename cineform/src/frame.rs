// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! The caller-facing frame type: a packed pixel buffer tagged
//! with its wire [`PixelFormat`] and dimensions. Distinct from
//! [`cineform_core::frame::Frame`], which is the arena/`PixelPlane`-bound internal shape the
//! wavelet ladder operates on — this type is what a caller hands to [`crate::Session::encode`]
//! and gets back from [`crate::Session::decode`], the same split an `AudioBufferRef`
//! (caller-facing) draws from a codec's internal DSP buffers.

use cineform_color::PixelFormat;
use cineform_core::errors::{CineformError, Result};
use cineform_core::frame::EncodedFormat;

/// A packed pixel buffer the caller owns, tagged with enough information to unpack it.
#[derive(Clone, Debug)]
pub struct Frame {
    pub pixel_format: PixelFormat,
    pub width: u32,
    pub height: u32,
    /// Rows in `[display_height, height)` are bottom-edge replication padding; `display_height` must be `<= height`.
    pub display_height: u32,
    pub data: Vec<u8>,
    /// Whether this frame should be encoded as a keyframe or, when `false`, as a difference
    /// frame against the session's most recently decoded/encoded keyframe.
    pub is_keyframe: bool,
}

impl Frame {
    pub fn new(
        pixel_format: PixelFormat,
        width: u32,
        height: u32,
        display_height: u32,
        data: Vec<u8>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CineformError::InvalidArgument("frame dimensions must be non-zero"));
        }
        if display_height > height {
            return Err(CineformError::InvalidArgument("display_height exceeds height"));
        }
        if data.is_empty() {
            return Err(CineformError::InvalidArgument("frame buffer must not be empty"));
        }

        Ok(Frame { pixel_format, width, height, display_height, data, is_keyframe: true })
    }

    pub fn as_difference(mut self) -> Self {
        self.is_keyframe = false;
        self
    }
}

/// The internal channel arrangement a wire [`PixelFormat`] unpacks into. Every unpacker in `cineform-color::format` produces a
/// channel count that matches exactly one of these.
pub(crate) fn encoded_format_for(format: PixelFormat) -> EncodedFormat {
    use PixelFormat::*;
    match format {
        Yuyv | Uyvy | Yu64 | Yr16 | V210 | Nv12 | Yv12 => EncodedFormat::Yuv422,
        Rg24 | Bgr24 | Rg48 | Rg30 | Ar10 | R210 | Dpx0 => EncodedFormat::Rgb,
        Rg32 | Rg64 | B64a | R408 | V408 | R4fl => EncodedFormat::Rgba,
        Bayer { .. } => EncodedFormat::Bayer4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            Frame::new(PixelFormat::Yuyv, 0, 16, 16, vec![0; 64]),
            Err(CineformError::InvalidArgument(_))
        ));
    }

    #[test]
    fn display_height_above_height_is_rejected() {
        assert!(matches!(
            Frame::new(PixelFormat::Yuyv, 16, 16, 32, vec![0; 512]),
            Err(CineformError::InvalidArgument(_))
        ));
    }

    #[test]
    fn encoded_format_matches_channel_count() {
        assert_eq!(encoded_format_for(PixelFormat::Yuyv).channel_count(), 3);
        assert_eq!(encoded_format_for(PixelFormat::Rg32).channel_count(), 4);
        assert_eq!(encoded_format_for(PixelFormat::Rg24).channel_count(), 3);
        assert_eq!(
            encoded_format_for(PixelFormat::Bayer { bits: 12, orientation: cineform_color::BayerOrientation::RedGrn })
                .channel_count(),
            4
        );
    }
}
