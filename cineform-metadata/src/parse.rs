// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! Parses a raw TLV metadata buffer into a [`PartialCfhdData`] overlay.

use cineform_container::chunk::ChunkReader;
use cineform_core::errors::Result;

use crate::data::{PartialCfhdData, ProcessPathFlags};
use crate::tags;

/// Parses every recognized tag out of `buffer`, ignoring unknown tags and type mismatches
///. Only a structurally corrupt TLV stream (a chunk whose declared length
/// runs past the buffer) is an error.
pub fn parse_metadata(buffer: &[u8]) -> Result<PartialCfhdData> {
    let mut data = PartialCfhdData::default();
    let mut reader = ChunkReader::new(buffer);

    while let Some((header, payload)) = reader.next()? {
        if !tags::type_matches(header.tag, header.ty) {
            log::debug!("ignoring metadata tag {:#06x}: type mismatch or unrecognized", header.tag);
            continue;
        }

        match header.tag {
            tags::CLIP_GUID => data.clip_guid = tags::read_guid(payload),
            tags::ENCODED_FORMAT => data.encoded_format = tags::read_u16(payload),
            tags::BAYER_FORMAT => data.bayer_format = tags::read_u8(payload),
            tags::ENCODE_CURVE => data.encode_curve = tags::read_u32(payload),
            tags::DECODE_CURVE => data.decode_curve = tags::read_u32(payload),
            tags::LOOK_CRC => data.look_crc = tags::read_u32(payload),
            tags::WHITE_BALANCE => data.white_balance = tags::read_f32_array::<4>(payload),
            tags::COLOR_MATRIX => data.color_matrix = tags::read_f32_array::<12>(payload),
            tags::GAMMA_TWEAKS => data.gamma_tweaks = tags::read_f32_array::<3>(payload),
            tags::PROCESS_PATH_FLAGS => {
                data.process_path_flags = tags::read_u32(payload).map(ProcessPathFlags::from_bits_truncate)
            }
            tags::UNIQUE_FRAME_NUMBER => data.unique_frame_number = tags::read_u32(payload),
            tags::TIMECODE => data.timecode = tags::read_counted_string(payload),
            tags::FRAMING_ZOOM => data.framing_zoom = tags::read_f32(payload),
            tags::FRAMING_OFFSET_X => data.framing_offset_x = tags::read_f32(payload),
            tags::FRAMING_OFFSET_Y => data.framing_offset_y = tags::read_f32(payload),
            tags::FRAMING_ROTATION => data.framing_rotation = tags::read_f32(payload),
            tags::FRAMING_TILT => data.framing_tilt = tags::read_f32(payload),
            tags::FRAMING_KEYSTONE => data.framing_keystone = tags::read_f32(payload),
            tags::CPU_LIMIT => data.cpu_limit = tags::read_u32(payload),
            tags::CPU_AFFINITY => data.cpu_affinity = tags::read_u32(payload),
            tags::COLORSPACE_OVERRIDE => data.colorspace_override = tags::read_u8(payload),
            _ => log::debug!("ignoring unrecognized metadata tag {:#06x}", header.tag),
        }
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cineform_container::chunk::{ChunkType, ChunkWriter};

    #[test]
    fn parses_recognized_tags_and_skips_unknown() {
        let mut buf = Vec::new();
        {
            let mut w = ChunkWriter::new(&mut buf);
            w.write_chunk(tags::FRAMING_ZOOM, ChunkType::F32, &1.5f32.to_be_bytes()).unwrap();
            w.write_chunk(0x8fff, ChunkType::U32, &[0; 4]).unwrap();
            w.write_chunk(tags::CPU_LIMIT, ChunkType::U32, &4u32.to_be_bytes()).unwrap();
        }

        let parsed = parse_metadata(&buf).unwrap();
        assert_eq!(parsed.framing_zoom, Some(1.5));
        assert_eq!(parsed.cpu_limit, Some(4));
    }

    #[test]
    fn type_mismatch_is_ignored_not_fatal() {
        let mut buf = Vec::new();
        {
            let mut w = ChunkWriter::new(&mut buf);
            // CPU_LIMIT is declared as U32/I32; write it as F32 instead.
            w.write_chunk(tags::CPU_LIMIT, ChunkType::F32, &1.0f32.to_be_bytes()).unwrap();
        }
        let parsed = parse_metadata(&buf).unwrap();
        assert_eq!(parsed.cpu_limit, None);
    }
}
