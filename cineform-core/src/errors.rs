// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! The `errors` module defines the common error type shared by every crate in the workspace.

use std::error::Error as StdError;
use std::fmt;
use std::io;

/// `CineformError` enumerates every failure mode a session's `encode`/`decode` entry points can
/// report. Kinds are not wrapped `Box<dyn Error>` chains where the cause is always a
/// known, bounded piece of context (a tag, a byte count, a state index) — that context is carried
/// directly in the variant so callers can log or match on it without downcasting.
#[derive(Debug)]
pub enum CineformError {
    /// Caller passed a null/empty buffer, a zero-dimension frame, or an unsupported pixel format.
    InvalidArgument(&'static str),
    /// Frame channel count or format did not match the requested operation.
    BadFrame(&'static str),
    /// Pixel layout is not supported by the called unpacker/packer.
    BadFormat(&'static str),
    /// A structural tag was unrecognized, the sample magic was wrong, or the version is newer
    /// than this decoder supports.
    UnsupportedSample(&'static str),
    /// The entropy-coded bitstream is corrupt: an FSM transitioned to an out-of-range state, a
    /// band's decoded coefficient count didn't match `width * height`, or a chunk's declared
    /// length ran past the end of the sample.
    CorruptBitstream(&'static str),
    /// A difference (P) frame was submitted for decoding with no keyframe held by the session.
    MissingReference,
    /// The scratch arena ran out of space; the caller under-provisioned the session.
    ScratchExhausted,
    /// A bitstream write ran past the end of the destination buffer.
    WriteOverflow,
    /// A bitstream read ran past the end of the source buffer.
    EndOfStream,
    /// An I/O error occurred reading an external metadata layer file.
    IoError(io::Error),
}

impl fmt::Display for CineformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CineformError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            CineformError::BadFrame(msg) => write!(f, "bad frame: {msg}"),
            CineformError::BadFormat(msg) => write!(f, "unsupported pixel format: {msg}"),
            CineformError::UnsupportedSample(msg) => write!(f, "unsupported sample: {msg}"),
            CineformError::CorruptBitstream(msg) => write!(f, "corrupt bitstream: {msg}"),
            CineformError::MissingReference => {
                write!(f, "difference frame decoded with no keyframe in session")
            }
            CineformError::ScratchExhausted => write!(f, "scratch arena exhausted"),
            CineformError::WriteOverflow => write!(f, "bitstream write overflowed its buffer"),
            CineformError::EndOfStream => write!(f, "bitstream read past end of buffer"),
            CineformError::IoError(err) => write!(f, "io error: {err}"),
        }
    }
}

impl StdError for CineformError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            CineformError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CineformError {
    fn from(err: io::Error) -> Self {
        CineformError::IoError(err)
    }
}

pub type Result<T> = std::result::Result<T, CineformError>;

/// Convenience constructor for an [`CineformError::InvalidArgument`].
pub fn invalid_argument<T>(msg: &'static str) -> Result<T> {
    Err(CineformError::InvalidArgument(msg))
}

/// Convenience constructor for a [`CineformError::BadFrame`].
pub fn bad_frame<T>(msg: &'static str) -> Result<T> {
    Err(CineformError::BadFrame(msg))
}

/// Convenience constructor for a [`CineformError::BadFormat`].
pub fn bad_format<T>(msg: &'static str) -> Result<T> {
    Err(CineformError::BadFormat(msg))
}

/// Convenience constructor for an [`CineformError::UnsupportedSample`].
pub fn unsupported_sample<T>(msg: &'static str) -> Result<T> {
    Err(CineformError::UnsupportedSample(msg))
}

/// Convenience constructor for a [`CineformError::CorruptBitstream`].
pub fn corrupt_bitstream<T>(msg: &'static str) -> Result<T> {
    Err(CineformError::CorruptBitstream(msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = CineformError::CorruptBitstream("fsm next_state out of range");
        assert!(err.to_string().contains("fsm next_state out of range"));
    }
}
