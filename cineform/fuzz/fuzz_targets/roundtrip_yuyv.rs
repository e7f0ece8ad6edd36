#![no_main]

use arbitrary::Arbitrary;
use cineform::{Frame, PixelFormat, Session, SessionConfig};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    width: u8,
    height: u8,
    lossless: bool,
    pixels: Vec<u8>,
}

// Exercises the full encode(decode) loop on arbitrary pixel content rather than just feeding
// raw bytes to the decoder: catches panics reachable only from a structurally valid sample that
// the encoder itself would never produce for a well-formed `Frame`, plus any encoder-side panic
// on odd dimensions.
fuzz_target!(|input: Input| {
    let width = (input.width as u32 / 2).max(1) * 2;
    let height = (input.height as u32).max(1);
    let needed = (width * height * 2) as usize;
    if input.pixels.len() < needed || needed == 0 {
        return;
    }

    let mut config = SessionConfig::new();
    if input.lossless {
        config = config.with_lossless(true);
    }
    let mut session = Session::new(config);

    let Ok(frame) = Frame::new(PixelFormat::Yuyv, width, height, height, input.pixels[..needed].to_vec())
    else {
        return;
    };

    if let Ok(sample) = session.encode(&frame) {
        let _ = session.decode(&sample, PixelFormat::Yuyv);
    }
});
