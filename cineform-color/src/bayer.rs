// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! Bayer mosaic unpacking into the internal G/R−G/B−G/ΔG quadrature.

/// The four mosaic orientations, in their on-wire tag order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BayerOrientation {
    RedGrn = 0,
    GrnRed = 1,
    BluGrn = 2,
    GrnBlu = 3,
}

impl BayerOrientation {
    pub fn from_tag(tag: u8) -> Option<BayerOrientation> {
        match tag {
            0 => Some(BayerOrientation::RedGrn),
            1 => Some(BayerOrientation::GrnRed),
            2 => Some(BayerOrientation::BluGrn),
            3 => Some(BayerOrientation::GrnBlu),
            _ => None,
        }
    }
}

/// One 2x2 mosaic quad's raw samples at full bit depth.
#[derive(Copy, Clone, Debug)]
pub struct MosaicQuad {
    pub top_left: u16,
    pub top_right: u16,
    pub bottom_left: u16,
    pub bottom_right: u16,
}

/// The internal quadrature a 2x2 mosaic quad unpacks to: `(G, ΔG, RG, BG)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Quadrature {
    pub g: i32,
    pub delta_g: i32,
    pub rg: i32,
    pub bg: i32,
}

/// Converts one mosaic quad to the internal quadrature:
/// `G = G1+G2`, `ΔG = (G1−G2)+mid`, `RG = 2R−G+mid`, `BG = 2B−G+mid`.
///
/// `mid` is the signed-offset midpoint for the 13-bit domain these outputs are expressed in
///.
pub fn unpack_quad(orientation: BayerOrientation, quad: MosaicQuad, mid: i32) -> Quadrature {
    let (r, g1, g2, b) = match orientation {
        BayerOrientation::RedGrn => (quad.top_left, quad.top_right, quad.bottom_left, quad.bottom_right),
        BayerOrientation::GrnRed => (quad.top_right, quad.top_left, quad.bottom_right, quad.bottom_left),
        BayerOrientation::BluGrn => (quad.bottom_right, quad.top_right, quad.bottom_left, quad.top_left),
        BayerOrientation::GrnBlu => (quad.bottom_left, quad.top_left, quad.bottom_right, quad.top_right),
    };

    let r = i32::from(r);
    let g1 = i32::from(g1);
    let g2 = i32::from(g2);
    let b = i32::from(b);

    let g = g1 + g2;
    let delta_g = (g1 - g2) + mid;
    let rg = 2 * r - g + mid;
    let bg = 2 * b - g + mid;

    Quadrature { g, delta_g, rg, bg }
}

/// Inverts [`unpack_quad`], recovering the mosaic quad's four raw samples.
pub fn pack_quad(orientation: BayerOrientation, q: Quadrature, mid: i32) -> MosaicQuad {
    let g_sum = q.g;
    let g1 = (g_sum + (q.delta_g - mid)).div_euclid(2);
    let g2 = g_sum - g1;
    let r = ((q.rg - mid) + g_sum).div_euclid(2);
    let b = ((q.bg - mid) + g_sum).div_euclid(2);

    let r = r.clamp(0, u16::MAX as i32) as u16;
    let g1 = g1.clamp(0, u16::MAX as i32) as u16;
    let g2 = g2.clamp(0, u16::MAX as i32) as u16;
    let b = b.clamp(0, u16::MAX as i32) as u16;

    match orientation {
        BayerOrientation::RedGrn => MosaicQuad { top_left: r, top_right: g1, bottom_left: g2, bottom_right: b },
        BayerOrientation::GrnRed => MosaicQuad { top_left: g1, top_right: r, bottom_left: b, bottom_right: g2 },
        BayerOrientation::BluGrn => MosaicQuad { top_left: g2, top_right: g1, bottom_left: b, bottom_right: r },
        BayerOrientation::GrnBlu => MosaicQuad { top_left: g1, top_right: g2, bottom_left: r, bottom_right: b },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A 32x32 RED_GRN tile, `R=255, G1=G2=128, B=0`.
    #[test]
    fn red_grn_orientation_unpacks_expected_quadrature() {
        let quad = MosaicQuad { top_left: 255, top_right: 128, bottom_left: 128, bottom_right: 0 };
        let mid = 0;
        let q = unpack_quad(BayerOrientation::RedGrn, quad, mid);
        assert_eq!(q.g, 256);
        assert_eq!(q.rg, 2 * 255 - 256);
        assert_eq!(q.bg, 0 - 256);
        assert_eq!(q.delta_g, 0);
    }

    #[test]
    fn unpack_then_pack_round_trips() {
        let mid = 4096;
        for orientation in [
            BayerOrientation::RedGrn,
            BayerOrientation::GrnRed,
            BayerOrientation::BluGrn,
            BayerOrientation::GrnBlu,
        ] {
            let quad = MosaicQuad { top_left: 900, top_right: 512, bottom_left: 480, bottom_right: 120 };
            let q = unpack_quad(orientation, quad, mid);
            let back = pack_quad(orientation, q, mid);
            assert_eq!(back.top_left, quad.top_left);
            assert_eq!(back.top_right, quad.top_right);
            assert_eq!(back.bottom_left, quad.bottom_left);
            assert_eq!(back.bottom_right, quad.bottom_right);
        }
    }
}
