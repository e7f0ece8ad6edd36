// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! `cineform-metadata` implements the layered CFHDDATA metadata database:
//! `UpdateCFHDDATA`, the ten-tier priority resolver, the identity defaults initializer, and the
//! external file-backed layer source.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod data;
pub mod layers;
pub mod parse;
pub mod source;
pub mod tags;

pub use data::{CfhdData, Framing, PartialCfhdData, ProcessPathFlags};
pub use layers::{ChannelDelta, Layer, LayeredDatabase, COMMON_CHANNEL};
pub use source::ExternalLayerSource;

use cineform_core::errors::Result;

/// A decoder's (or encoder's) metadata database: the layered store plus the clip GUID it was
/// last reset for.
#[derive(Clone, Debug, Default)]
pub struct Database {
    layers: LayeredDatabase,
    clip_guid: Option<[u8; 16]>,
}

impl Database {
    pub fn new() -> Self {
        Database::default()
    }

    /// `UpdateCFHDDATA(decoder, buffer, len, channel_delta, priority)`: parses
    /// `buffer` as a TLV metadata stream and installs it as `priority`'s overlay for
    /// `channel_delta`. If the parsed buffer carries a `Clip-GUID` different from the one this
    /// database was last reset for, every layer is cleared and reset to identity defaults first
    ///.
    pub fn update_cfhddata(&mut self, buffer: &[u8], channel_delta: ChannelDelta, priority: Layer) -> Result<()> {
        let parsed = parse::parse_metadata(buffer)?;

        if let Some(guid) = parsed.clip_guid {
            if self.clip_guid != Some(guid) {
                self.layers.clear_all();
                self.clip_guid = Some(guid);
            }
        }

        self.layers.set_layer(priority, channel_delta, parsed);
        Ok(())
    }

    /// Resolves the effective CFHDDATA for `channel` across every installed layer.
    pub fn effective(&self, channel: ChannelDelta) -> CfhdData {
        self.layers.resolve(channel)
    }

    pub fn clip_guid(&self) -> Option<[u8; 16]> {
        self.clip_guid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cineform_container::chunk::{ChunkType, ChunkWriter};

    fn chunk_with_zoom(zoom: f32) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut w = ChunkWriter::new(&mut buf);
        w.write_chunk(tags::FRAMING_ZOOM, ChunkType::F32, &zoom.to_be_bytes()).unwrap();
        buf
    }

    /// Database layer sets saturation=1.5 (here: framing zoom stands in for "a field"),
    /// override layer sets 0.8; the override wins; removing the override layer reverts
    /// resolution to the database layer.
    #[test]
    fn override_layer_beats_database_layer() {
        let mut db = Database::new();
        db.update_cfhddata(&chunk_with_zoom(1.5), COMMON_CHANNEL, Layer::Database).unwrap();
        db.update_cfhddata(&chunk_with_zoom(0.8), COMMON_CHANNEL, Layer::Override).unwrap();
        assert_eq!(db.effective(COMMON_CHANNEL).framing.zoom, 0.8);

        db.layers.clear_layer(Layer::Override, COMMON_CHANNEL);
        assert_eq!(db.effective(COMMON_CHANNEL).framing.zoom, 1.5);
    }

    #[test]
    fn guid_change_resets_every_layer() {
        let mut db = Database::new();
        db.update_cfhddata(&chunk_with_zoom(2.0), COMMON_CHANNEL, Layer::Base).unwrap();
        assert_eq!(db.effective(COMMON_CHANNEL).framing.zoom, 2.0);

        let mut buf = Vec::new();
        let mut w = ChunkWriter::new(&mut buf);
        w.write_chunk(tags::CLIP_GUID, ChunkType::Guid, &[7u8; 16]).unwrap();
        db.update_cfhddata(&buf, COMMON_CHANNEL, Layer::Base).unwrap();

        assert_eq!(db.effective(COMMON_CHANNEL).framing.zoom, 1.0);
        assert_eq!(db.clip_guid(), Some([7u8; 16]));
    }
}
