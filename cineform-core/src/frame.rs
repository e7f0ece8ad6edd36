// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! Frames and the enumerated pixel/encoded-format tags they carry.

use arrayvec::ArrayVec;

use crate::plane::PixelPlane;

/// The internal channel arrangement a frame is encoded/decoded as. Distinct from the wire pixel
/// format (`PixelFormat`, owned by `cineform-color`): this is the *encoded* shape the wavelet
/// transform operates on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EncodedFormat {
    /// Single luma-like channel.
    Gray,
    /// Luma + two chroma channels, chroma subsampled 4:2:2 horizontally.
    Yuv422,
    /// Three full-resolution channels.
    Rgb,
    /// Three full-resolution channels plus an alpha/green-difference channel.
    Rgba,
    /// Four full-resolution channels: G-sum, R−G, B−G, G1−G2.
    Bayer4,
}

impl EncodedFormat {
    /// Number of channels a frame of this encoded format carries.
    pub fn channel_count(self) -> usize {
        match self {
            EncodedFormat::Gray => 1,
            EncodedFormat::Yuv422 => 3,
            EncodedFormat::Rgb => 3,
            EncodedFormat::Rgba => 4,
            EncodedFormat::Bayer4 => 4,
        }
    }
}

/// Maximum channels any supported [`EncodedFormat`] carries.
pub const MAX_CHANNELS: usize = 4;

/// A decoded or to-be-encoded frame: `{format, width, height, display_height, channels,
/// is_keyframe, encoded-format tag}`.
///
/// Channel ordering is semantic, not positional: channel 0 is luma or green; 1/2 are chroma or
/// red/blue; 3 is alpha or green-difference (`ΔG`) for Bayer. Rows in `[display_height, height)`
/// are bottom-edge replication padding the wavelet needs to avoid ringing and must never be
/// surfaced to the caller.
pub struct Frame<'a> {
    pub format: EncodedFormat,
    pub width: u32,
    pub height: u32,
    pub display_height: u32,
    pub channels: ArrayVec<PixelPlane<'a>, MAX_CHANNELS>,
    pub is_keyframe: bool,
}

impl<'a> Frame<'a> {
    /// The subset of `channels()` rows that are real image content, not bottom-edge padding.
    pub fn display_rows(&self, channel: usize) -> std::ops::Range<u32> {
        0..self.display_height.min(self.channels[channel].height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_counts_match_encoded_formats() {
        assert_eq!(EncodedFormat::Gray.channel_count(), 1);
        assert_eq!(EncodedFormat::Yuv422.channel_count(), 3);
        assert_eq!(EncodedFormat::Rgba.channel_count(), 4);
        assert_eq!(EncodedFormat::Bayer4.channel_count(), 4);
    }
}
