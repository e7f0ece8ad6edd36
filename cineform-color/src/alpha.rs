// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! The alpha channel's nonlinear encoding curve: strict `0` and strict `255`
//! pass through unchanged, intermediate values are remapped into the companded 12-bit domain.
//!
//! The `223`/`128` constants appear in two forms across encode and decode; [`decode`] carries
//! the source constants and [`encode`] is the numerically derived inverse (see `DESIGN.md`).

/// Remaps a linear 8-bit alpha sample into the codec's internal companded domain
///. `0` and `255` are fixed points.
#[inline]
pub fn encode(a: u8) -> u16 {
    match a {
        0 => 0,
        255 => 4095,
        a => {
            let a = u32::from(a);
            (((223 * a + 128) >> 8) + 16) as u16
        }
    }
}

/// Inverts [`encode`]: recovers a linear 8-bit alpha sample from its companded 12-bit form.
#[inline]
pub fn decode(value: u16) -> u8 {
    match value {
        0 => 0,
        4095 => 255,
        value => {
            let v = i32::from(value).saturating_sub(16).max(0);
            ((v * 255 + 223 / 2) / 223).clamp(0, 255) as u8
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_black_and_white_are_fixed_points() {
        assert_eq!(encode(0), 0);
        assert_eq!(encode(255), 4095);
        assert_eq!(decode(0), 0);
        assert_eq!(decode(4095), 255);
    }

    #[test]
    fn intermediate_values_round_trip_within_one() {
        for a in 1u8..255 {
            let coded = encode(a);
            let back = decode(coded);
            assert!((i32::from(back) - i32::from(a)).abs() <= 2, "a={a} coded={coded} back={back}");
        }
    }

    #[test]
    fn encode_is_monotone() {
        let mut prev = 0u16;
        for a in 0u8..=255 {
            let coded = encode(a);
            assert!(coded >= prev, "alpha companding regressed at a={a}");
            prev = coded;
        }
    }
}
