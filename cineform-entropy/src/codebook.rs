// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! The merged run/magnitude codebook.
//!
//! `vlc.h`'s `RMCBOOK` combines a separate run-length codebook and magnitude codebook into one
//! Huffman tree so the two share a single prefix-free code space. The actual GoPro-tuned Huffman
//! weights aren't available here (only the data structure declarations in `vlc.h` are), so
//! this builds the same *shape* — one prefix-free tree over `{BAND_END} ∪ {zero runs} ∪
//! {nonzero magnitudes}` — from an order-0 Exp-Golomb code instead of a frequency-tuned Huffman
//! table: monotonically increasing codeword length as the run/magnitude grows, which is the
//! property a real Huffman table gets from the source statistics. See `DESIGN.md`.
//!
//! Every assigned codeword is at least [`MIN_CODE_LEN`] bits; `fsm` relies on this to guarantee
//! at most one symbol completes per 4-bit FSM step.

use cineform_core::errors::{CineformError, Result};
use cineform_core::io::{BitReader, BitWriter};

/// Sentinel magnitude value marking the end of a band's coefficient stream. Outside the representable companded range (±1023), so it can never collide
/// with a real coefficient.
pub const BAND_END: i16 = i16::MIN;

/// Reserve the three shortest Exp-Golomb ids (lengths 1, 3, 3) so every symbol we actually assign
/// gets a codeword of at least 4 bits.
const RESERVED_IDS: u32 = 3;
const MIN_CODE_LEN: u8 = 4;

/// Upper bounds on what a codebook will encode directly. Runs longer than `max_run` are split by
/// the encoder into repeated max-run codes;
/// magnitudes beyond `max_magnitude` are saturated and recorded in the band's peaks table
///.
#[derive(Copy, Clone, Debug)]
pub struct CodebookLimits {
    pub max_run: u32,
    pub max_magnitude: u16,
}

impl Default for CodebookLimits {
    fn default() -> Self {
        // max_magnitude matches the companded coefficient range.
        CodebookLimits { max_run: 4096, max_magnitude: 1023 }
    }
}

/// One decoded unit of the band's entropy stream: a run of zero coefficients, a nonzero magnitude
///, or the band-end sentinel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Symbol {
    BandEnd,
    ZeroRun(u32),
    Magnitude(u16),
}

impl Symbol {
    fn to_id(self) -> u32 {
        match self {
            Symbol::BandEnd => 0,
            Symbol::ZeroRun(run) => {
                debug_assert!(run >= 1);
                2 * run - 1
            }
            Symbol::Magnitude(mag) => {
                debug_assert!(mag >= 1);
                2 * u32::from(mag)
            }
        }
    }

    fn from_id(id: u32) -> Symbol {
        if id == 0 {
            Symbol::BandEnd
        }
        else if id % 2 == 1 {
            Symbol::ZeroRun((id + 1) / 2)
        }
        else {
            Symbol::Magnitude((id / 2) as u16)
        }
    }
}

/// Order-0 Exp-Golomb codeword for `n`: returns `(value, bit_len)` where `value` is the whole
/// codeword read right-justified as a single integer (the leading unary zeros contribute no
/// numeric value, so the codeword is exactly `m = n + 1`, written in `2*k + 1` bits where
/// `k = floor(log2(m))`).
fn exp_golomb_code(n: u32) -> (u32, u8) {
    let m = n + 1;
    let k = 31 - m.leading_zeros();
    (m, (2 * k + 1) as u8)
}

fn exp_golomb_decode_len(leading: u32) -> u8 {
    (2 * leading + 1) as u8
}

/// The merged run/magnitude/band-end codebook.
pub struct Codebook {
    pub limits: CodebookLimits,
}

impl Codebook {
    pub fn new(limits: CodebookLimits) -> Self {
        Codebook { limits }
    }

    fn codeword(&self, symbol: Symbol) -> (u32, u8) {
        let n = symbol.to_id() + RESERVED_IDS;
        exp_golomb_code(n)
    }

    /// Writes one symbol's codeword.
    pub fn write_symbol(&self, writer: &mut BitWriter<'_>, symbol: Symbol) -> Result<()> {
        let (value, len) = self.codeword(symbol);
        writer.put_bits(value, u32::from(len))
    }

    /// Reads one symbol by counting the Exp-Golomb unary prefix then the binary suffix. This is
    /// the reference sequential decoder; `fsm::Fsm` decodes the same stream four bits at a time
    /// for speed but must agree with this bit-for-bit.
    pub fn read_symbol(&self, reader: &mut BitReader<'_>) -> Result<Symbol> {
        let mut leading = 0u32;
        while reader.get_bits(1) == 0 {
            leading += 1;
            if reader.end_of_stream() {
                return Err(CineformError::CorruptBitstream("codeword ran past end of sample"));
            }
            if leading > 32 {
                return Err(CineformError::CorruptBitstream("codeword unary prefix too long"));
            }
        }
        let len = exp_golomb_decode_len(leading);
        let suffix_len = len - leading as u8 - 1;
        let suffix = reader.get_bits(u32::from(suffix_len));
        let m = (1u32 << suffix_len) | suffix;
        let n = m - 1;
        if n < RESERVED_IDS {
            return Err(CineformError::CorruptBitstream("codeword decoded a reserved id"));
        }
        Ok(Symbol::from_id(n - RESERVED_IDS))
    }

    /// Every symbol this codebook can directly represent, in ascending id order (used to build
    /// the FSM's trie; bounded by `limits`).
    pub fn all_symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        std::iter::once(Symbol::BandEnd)
            .chain((1..=self.limits.max_run).map(Symbol::ZeroRun))
            .chain((1..=self.limits.max_magnitude).map(Symbol::Magnitude))
    }

    pub(crate) fn codeword_bits(&self, symbol: Symbol) -> Vec<bool> {
        let (value, len) = self.codeword(symbol);
        (0..len).map(|i| (value >> (len - 1 - i)) & 1 != 0).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_assigned_codeword_is_at_least_min_len() {
        let codebook = Codebook::new(CodebookLimits { max_run: 32, max_magnitude: 32 });
        for symbol in codebook.all_symbols() {
            let (_, len) = codebook.codeword(symbol);
            assert!(len >= MIN_CODE_LEN, "{symbol:?} had length {len}");
        }
    }

    #[test]
    fn symbol_round_trips_through_bits() {
        let codebook = Codebook::new(CodebookLimits::default());
        let symbols =
            [Symbol::BandEnd, Symbol::ZeroRun(1), Symbol::ZeroRun(200), Symbol::Magnitude(1), Symbol::Magnitude(900)];

        let mut buf = [0u8; 64];
        {
            let mut w = BitWriter::new(&mut buf);
            for &s in &symbols {
                codebook.write_symbol(&mut w, s).unwrap();
            }
            w.finish().unwrap();
        }

        let mut r = BitReader::new(&buf);
        for &expected in &symbols {
            assert_eq!(codebook.read_symbol(&mut r).unwrap(), expected);
        }
    }

    #[test]
    fn codeword_length_grows_with_magnitude() {
        let codebook = Codebook::new(CodebookLimits::default());
        let (_, small_len) = codebook.codeword(Symbol::Magnitude(1));
        let (_, big_len) = codebook.codeword(Symbol::Magnitude(900));
        assert!(big_len > small_len);
    }
}
