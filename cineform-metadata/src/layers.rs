// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! Layer priority and resolution.

use std::collections::BTreeMap;

use crate::data::{CfhdData, PartialCfhdData};

/// One of the ten priority layers, ordered here from lowest to highest so `#[derive(Ord)]`
/// ranks them exactly as the "highest wins" priority list does in reverse (`Override2` is
/// `Ord::max`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Base,
    Frame,
    Frame1,
    Frame2,
    Database,
    Database1,
    Database2,
    Override,
    Override1,
    Override2,
}

/// `channel_delta` selects a per-channel override for stereo content; `0` applies to both eyes
///.
pub type ChannelDelta = u8;

/// The common (channel-agnostic) slot a layer's data lives in when `channel_delta == 0`.
pub const COMMON_CHANNEL: ChannelDelta = 0;

/// A layered store of `PartialCfhdData` overlays, keyed by `(layer, channel)`. Resolution walks
/// layers from highest to lowest priority; within a layer, a per-channel overlay is checked
/// before falling back to the common overlay for that same layer.
#[derive(Clone, Debug, Default)]
pub struct LayeredDatabase {
    layers: BTreeMap<(Layer, ChannelDelta), PartialCfhdData>,
}

impl LayeredDatabase {
    pub fn new() -> Self {
        LayeredDatabase::default()
    }

    /// Installs (replacing any prior contents) the overlay for `(layer, channel)`.
    pub fn set_layer(&mut self, layer: Layer, channel: ChannelDelta, data: PartialCfhdData) {
        self.layers.insert((layer, channel), data);
    }

    pub fn clear_layer(&mut self, layer: Layer, channel: ChannelDelta) {
        self.layers.remove(&(layer, channel));
    }

    /// Clears every layer.
    pub fn clear_all(&mut self) {
        self.layers.clear();
    }

    /// Resolves the effective [`CfhdData`] for `channel`, starting from
    /// [`CfhdData::default`](crate::data::CfhdData) and overlaying every layer from lowest
    /// priority to highest so later (higher-priority) writes win.
    pub fn resolve(&self, channel: ChannelDelta) -> CfhdData {
        let mut effective = CfhdData::default();

        // BTreeMap iterates keys in ascending order; `Layer` is declared lowest-to-highest, so
        // the natural iteration order already applies lower layers first. Walk the common
        // channel for each layer first, then that layer's channel-specific overlay, so the
        // per-channel overlay always wins within the same layer.
        for layer in [
            Layer::Base,
            Layer::Frame,
            Layer::Frame1,
            Layer::Frame2,
            Layer::Database,
            Layer::Database1,
            Layer::Database2,
            Layer::Override,
            Layer::Override1,
            Layer::Override2,
        ] {
            if let Some(common) = self.layers.get(&(layer, COMMON_CHANNEL)) {
                common.apply_onto(&mut effective);
            }
            if channel != COMMON_CHANNEL {
                if let Some(per_channel) = self.layers.get(&(layer, channel)) {
                    per_channel.apply_onto(&mut effective);
                }
            }
        }

        effective
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_priority_layer_wins() {
        let mut db = LayeredDatabase::new();
        let mut database_layer = PartialCfhdData::default();
        database_layer.framing_zoom = Some(1.5);
        db.set_layer(Layer::Database, COMMON_CHANNEL, database_layer);

        let mut override_layer = PartialCfhdData::default();
        override_layer.framing_zoom = Some(0.8);
        db.set_layer(Layer::Override, COMMON_CHANNEL, override_layer);

        assert_eq!(db.resolve(COMMON_CHANNEL).framing.zoom, 0.8);

        db.clear_layer(Layer::Override, COMMON_CHANNEL);
        assert_eq!(db.resolve(COMMON_CHANNEL).framing.zoom, 1.5);
    }

    #[test]
    fn per_channel_overlay_wins_over_common_at_same_layer() {
        let mut db = LayeredDatabase::new();
        let mut common = PartialCfhdData::default();
        common.framing_zoom = Some(1.0);
        db.set_layer(Layer::Frame, COMMON_CHANNEL, common);

        let mut right_eye = PartialCfhdData::default();
        right_eye.framing_zoom = Some(1.2);
        db.set_layer(Layer::Frame, 2, right_eye);

        assert_eq!(db.resolve(1).framing.zoom, 1.0);
        assert_eq!(db.resolve(2).framing.zoom, 1.2);
    }

    #[test]
    fn unset_fields_fall_through_to_defaults() {
        let db = LayeredDatabase::new();
        let resolved = db.resolve(COMMON_CHANNEL);
        assert_eq!(resolved, CfhdData::default());
    }
}
