#![no_main]

use arbitrary::Arbitrary;
use cineform::{PixelFormat, Session, SessionConfig};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum OutFormat {
    Yuyv,
    Uyvy,
    Yr16,
    Rg24,
    Rg32,
    Rg48,
    Rg64,
}

impl From<OutFormat> for PixelFormat {
    fn from(f: OutFormat) -> Self {
        match f {
            OutFormat::Yuyv => PixelFormat::Yuyv,
            OutFormat::Uyvy => PixelFormat::Uyvy,
            OutFormat::Yr16 => PixelFormat::Yr16,
            OutFormat::Rg24 => PixelFormat::Rg24,
            OutFormat::Rg32 => PixelFormat::Rg32,
            OutFormat::Rg48 => PixelFormat::Rg48,
            OutFormat::Rg64 => PixelFormat::Rg64,
        }
    }
}

#[derive(Arbitrary, Debug)]
struct Input {
    out_format: OutFormat,
    lossless: bool,
    sample: Vec<u8>,
}

// Drives a wider span of output pixel layouts than `decode_sample`, and exercises decode twice
// in a row on the same session to catch state that leaks between samples (stale keyframe,
// stale FSM cache entries).
fuzz_target!(|input: Input| {
    let mut config = SessionConfig::new();
    if input.lossless {
        config = config.with_lossless(true);
    }
    let mut session = Session::new(config);
    let out: PixelFormat = input.out_format.into();
    let _ = session.decode(&input.sample, out);
    let _ = session.decode(&input.sample, out);
});
