// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! CRC-32 (IEEE 802.3 polynomial), used to validate the `Look-CRC` metadata tag.

const POLY: u32 = 0xedb8_8320;

fn table_entry(mut byte: u32) -> u32 {
    for _ in 0..8 {
        byte = if byte & 1 != 0 { POLY ^ (byte >> 1) } else { byte >> 1 };
    }
    byte
}

/// A running CRC-32/IEEE checksum.
///
/// Unlike [`super::Md5`]-style monitors elsewhere in the ecosystem, this is computed directly
/// over a byte slice rather than as a `Monitor` hooked into a byte stream, since the only
/// consumer (`cineform-metadata`'s look-file CRC check) always has the whole buffer in hand.
pub struct Crc32 {
    state: u32,
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc32 {
    pub fn new() -> Self {
        Crc32 { state: 0xffff_ffff }
    }

    pub fn process_byte(&mut self, byte: u8) {
        let index = ((self.state ^ u32::from(byte)) & 0xff) as usize;
        self.state = table_entry(index as u32) ^ (self.state >> 8);
    }

    pub fn process_buf_bytes(&mut self, buf: &[u8]) {
        for &b in buf {
            self.process_byte(b);
        }
    }

    pub fn crc(&self) -> u32 {
        !self.state
    }
}

/// Computes the CRC-32/IEEE checksum of `buf` in one shot.
pub fn crc32(buf: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.process_buf_bytes(buf);
    crc.crc()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector() {
        // "123456789" => 0xCBF43926 is the standard CRC-32/IEEE check value.
        assert_eq!(crc32(b"123456789"), 0xcbf4_3926);
    }

    #[test]
    fn empty_buffer_is_zero() {
        assert_eq!(crc32(b""), 0);
    }
}
