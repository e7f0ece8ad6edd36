#![no_main]

use cineform::{PixelFormat, Session, SessionConfig};
use libfuzzer_sys::fuzz_target;

// For any byte string of length <= 1 MiB, decode either succeeds or returns a specific error
// code, and never reads past the buffer. libFuzzer already bounds input size well below 1 MiB
// in practice; the property under test here is "never panics".
fuzz_target!(|data: &[u8]| {
    let mut session = Session::new(SessionConfig::new());
    let _ = session.decode(data, PixelFormat::Yuyv);
});
