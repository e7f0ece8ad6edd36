// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! Structural chunk tags: the fixed set of tags `cineform-container` itself
//! understands, as opposed to metadata tags (`>= 0x8000`) that are opaque to it and forwarded to
//! `cineform-metadata`.

use cineform_core::errors::{CineformError, Result};

macro_rules! structural_tags {
    ($($name:ident = $value:expr),+ $(,)?) => {
        $(pub const $name: u16 = $value;)+

        /// Parses a raw tag into the known structural enum, or reports `UnsupportedSample` if the
        /// tag is `< 0x8000` (structural range) but unrecognized.
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum StructuralTag {
            $($name,)+
        }

        impl StructuralTag {
            pub fn from_raw(tag: u16) -> Result<StructuralTag> {
                match tag {
                    $($value => Ok(StructuralTag::$name),)+
                    _ => Err(CineformError::UnsupportedSample("unrecognized structural tag")),
                }
            }

            pub fn raw(self) -> u16 {
                match self {
                    $(StructuralTag::$name => $value,)+
                }
            }
        }
    };
}

structural_tags! {
    SAMPLE_HEADER = 0x0001,
    CHANNEL_INDEX = 0x0002,
    CHANNEL_SIZE = 0x0003,
    WAVELET_LEVEL = 0x0004,
    BAND_HEADER = 0x0005,
    BAND_PAYLOAD = 0x0006,
    SAMPLE_END = 0x0007,
}
