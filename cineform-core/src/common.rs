// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! The `common` module defines small enums and newtypes shared across the workspace.

use std::fmt;

/// A four-character-code tag, as used for the sample magic (`'CFHD'`) and pixel-format tags
/// (`YUYV`, `V210`, `BYR4`, ...), keyed the same way a per-codec `FourCc` newtype would be:
/// a transparent wrapper around four ASCII bytes with a `Display` impl that prints the original
/// characters rather than a numeric value.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FourCc([u8; 4]);

impl FourCc {
    pub const fn new(tag: [u8; 4]) -> FourCc {
        FourCc(tag)
    }

    pub const fn get(&self) -> [u8; 4] {
        self.0
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCc({})", self)
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

/// Describes the relative preference of a registered FSM/codebook builder or metadata layer
/// source if more than one is able to service the same request, used to break ties between
/// registered decoders/readers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tier {
    /// Prefer over others.
    Preferred,
    /// Neither preferred nor a fallback.
    Standard,
    /// Use only if nothing else is available.
    Fallback,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_cc_round_trips_display() {
        let tag = FourCc::new(*b"CFHD");
        assert_eq!(tag.to_string(), "CFHD");
        assert_eq!(tag.get(), *b"CFHD");
    }
}
