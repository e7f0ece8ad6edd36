// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! The typed `CFHDDATA` struct and the identity defaults it resets to on GUID
//! change.

use bitflags::bitflags;

bitflags! {
    /// Which optional processing stages are active.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct ProcessPathFlags: u32 {
        const COLOR_MATRIX = 1 << 0;
        const WHITE_BALANCE = 1 << 1;
        const LOOK_FILE = 1 << 2;
        const GAMMA_TWEAKS = 1 << 3;
        const FRAMING = 1 << 4;
    }
}

/// Framing parameters (zoom, offsets, rotation, tilt, keystone).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Framing {
    pub zoom: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub rotation: f32,
    pub tilt: f32,
    pub keystone: f32,
}

impl Default for Framing {
    fn default() -> Self {
        Framing { zoom: 1.0, offset_x: 0.0, offset_y: 0.0, rotation: 0.0, tilt: 0.0, keystone: 0.0 }
    }
}

/// The 4x3 identity color matrix, flattened row-major.
const IDENTITY_COLOR_MATRIX: [f32; 12] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
];

/// The effective (already layer-resolved) metadata for one sample.
#[derive(Clone, Debug, PartialEq)]
pub struct CfhdData {
    pub clip_guid: [u8; 16],
    pub encoded_format: u16,
    pub bayer_format: u8,
    pub encode_curve: u32,
    pub decode_curve: u32,
    pub look_crc: u32,
    pub white_balance: [f32; 4],
    pub color_matrix: [f32; 12],
    pub gamma_tweaks: [f32; 3],
    pub process_path_flags: ProcessPathFlags,
    pub unique_frame_number: u32,
    pub timecode: String,
    pub framing: Framing,
    pub cpu_limit: u32,
    pub cpu_affinity: u32,
    pub colorspace_override: Option<u8>,
}

impl Default for CfhdData {
    /// The defaults initializer.
    fn default() -> Self {
        CfhdData {
            clip_guid: [0; 16],
            encoded_format: 0,
            bayer_format: 0,
            encode_curve: 0,
            decode_curve: 0,
            look_crc: 0,
            white_balance: [1.0; 4],
            color_matrix: IDENTITY_COLOR_MATRIX,
            gamma_tweaks: [1.0; 3],
            process_path_flags: ProcessPathFlags::empty(),
            unique_frame_number: 0,
            timecode: String::new(),
            framing: Framing::default(),
            cpu_limit: u32::MAX,
            cpu_affinity: 0,
            colorspace_override: None,
        }
    }
}

/// One layer's worth of metadata: every field is `Option`, `None` meaning "this layer has no
/// opinion" so the resolver (`layers::resolve`) falls through to the next lower layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PartialCfhdData {
    pub clip_guid: Option<[u8; 16]>,
    pub encoded_format: Option<u16>,
    pub bayer_format: Option<u8>,
    pub encode_curve: Option<u32>,
    pub decode_curve: Option<u32>,
    pub look_crc: Option<u32>,
    pub white_balance: Option<[f32; 4]>,
    pub color_matrix: Option<[f32; 12]>,
    pub gamma_tweaks: Option<[f32; 3]>,
    pub process_path_flags: Option<ProcessPathFlags>,
    pub unique_frame_number: Option<u32>,
    pub timecode: Option<String>,
    pub framing_zoom: Option<f32>,
    pub framing_offset_x: Option<f32>,
    pub framing_offset_y: Option<f32>,
    pub framing_rotation: Option<f32>,
    pub framing_tilt: Option<f32>,
    pub framing_keystone: Option<f32>,
    pub cpu_limit: Option<u32>,
    pub cpu_affinity: Option<u32>,
    pub colorspace_override: Option<u8>,
}

impl PartialCfhdData {
    /// Overlays every field this layer sets onto `base`, leaving fields it has no opinion on
    /// untouched.
    pub fn apply_onto(&self, base: &mut CfhdData) {
        if let Some(v) = self.clip_guid {
            base.clip_guid = v;
        }
        if let Some(v) = self.encoded_format {
            base.encoded_format = v;
        }
        if let Some(v) = self.bayer_format {
            base.bayer_format = v;
        }
        if let Some(v) = self.encode_curve {
            base.encode_curve = v;
        }
        if let Some(v) = self.decode_curve {
            base.decode_curve = v;
        }
        if let Some(v) = self.look_crc {
            base.look_crc = v;
        }
        if let Some(v) = self.white_balance {
            base.white_balance = v;
        }
        if let Some(v) = self.color_matrix {
            base.color_matrix = v;
        }
        if let Some(v) = self.gamma_tweaks {
            base.gamma_tweaks = v;
        }
        if let Some(v) = self.process_path_flags {
            base.process_path_flags = v;
        }
        if let Some(v) = self.unique_frame_number {
            base.unique_frame_number = v;
        }
        if let Some(v) = &self.timecode {
            base.timecode = v.clone();
        }
        if let Some(v) = self.framing_zoom {
            base.framing.zoom = v;
        }
        if let Some(v) = self.framing_offset_x {
            base.framing.offset_x = v;
        }
        if let Some(v) = self.framing_offset_y {
            base.framing.offset_y = v;
        }
        if let Some(v) = self.framing_rotation {
            base.framing.rotation = v;
        }
        if let Some(v) = self.framing_tilt {
            base.framing.tilt = v;
        }
        if let Some(v) = self.framing_keystone {
            base.framing.keystone = v;
        }
        if let Some(v) = self.cpu_limit {
            base.cpu_limit = v;
        }
        if let Some(v) = self.cpu_affinity {
            base.cpu_affinity = v;
        }
        if let Some(v) = self.colorspace_override {
            base.colorspace_override = Some(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_identity() {
        let data = CfhdData::default();
        assert_eq!(data.color_matrix, IDENTITY_COLOR_MATRIX);
        assert_eq!(data.white_balance, [1.0; 4]);
        assert_eq!(data.framing.zoom, 1.0);
        assert_eq!(data.framing.offset_x, 0.0);
    }

    #[test]
    fn partial_overlay_only_touches_set_fields() {
        let mut data = CfhdData::default();
        let mut partial = PartialCfhdData::default();
        partial.framing_zoom = Some(2.0);
        partial.apply_onto(&mut data);
        assert_eq!(data.framing.zoom, 2.0);
        assert_eq!(data.framing.offset_x, 0.0);
        assert_eq!(data.color_matrix, IDENTITY_COLOR_MATRIX);
    }
}
