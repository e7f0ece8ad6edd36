// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! The session orchestrator: owns the worker pool, the FSM cache, the
//! metadata database, and the one stored keyframe a difference frame is built against, and wires
//! every other crate's pure function together into `encode`/`decode`.

use std::sync::OnceLock;

use cineform_core::errors::{CineformError, Result};
use cineform_core::frame::EncodedFormat;
use cineform_metadata::{CfhdData, ChannelDelta, Database, ExternalLayerSource, Layer};

use crate::config::SessionConfig;
use crate::frame::Frame;
use crate::fsm_cache::FsmCache;
use crate::pool::WorkerPool;
use crate::stats::{SessionStats, StatsSnapshot};
use crate::{decode, encode};
use cineform_color::PixelFormat;

/// The most recently encoded or decoded keyframe's reconstructed channel planes, kept around so a
/// subsequent difference frame has something to diff against and inherit unchanged channels from
///.
pub(crate) struct StoredKeyframe {
    pub format: EncodedFormat,
    pub width: usize,
    pub height: usize,
    /// One `Vec<i16>` per channel, row-major at that channel's own (possibly subsampled)
    /// dimensions.
    pub channels: Vec<Vec<i16>>,
    pub channel_dims: Vec<(usize, usize)>,
}

/// A CineForm encode/decode context: the caller constructs one per clip (or per
/// concurrent decode stream) and calls [`Session::encode`]/[`Session::decode`] once per frame.
pub struct Session {
    config: SessionConfig,
    pool: OnceLock<WorkerPool>,
    pub(crate) fsm_cache: FsmCache,
    pub(crate) metadata: Database,
    external_layers: Option<ExternalLayerSource>,
    pub(crate) keyframe: Option<StoredKeyframe>,
    pub(crate) stats: SessionStats,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Session {
            config,
            pool: OnceLock::new(),
            fsm_cache: FsmCache::new(),
            metadata: Database::new(),
            external_layers: None,
            keyframe: None,
            stats: SessionStats::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Installs the search path list consulted for externally-refreshed metadata layers
    ///. Overwrites any previously installed source.
    pub fn set_external_layer_search_paths(&mut self, search_paths: Vec<std::path::PathBuf>) {
        self.external_layers = Some(ExternalLayerSource::new(search_paths));
    }

    pub fn external_layers(&self) -> Option<&ExternalLayerSource> {
        self.external_layers.as_ref()
    }

    /// `UpdateCFHDDATA`: installs `buffer` as `priority`'s metadata overlay for
    /// `channel_delta`.
    pub fn update_metadata(&mut self, buffer: &[u8], channel_delta: ChannelDelta, priority: Layer) -> Result<()> {
        self.metadata.update_cfhddata(buffer, channel_delta, priority)
    }

    /// Resolves the currently effective CFHDDATA for `channel` across every installed layer
    ///, including any overlay a just-decoded sample's in-band metadata installed.
    pub fn effective_metadata(&self, channel_delta: ChannelDelta) -> CfhdData {
        self.metadata.effective(channel_delta)
    }

    /// Lazily spawns the worker pool on first use and returns a reference to it.
    pub(crate) fn pool(&self) -> &WorkerPool {
        self.pool.get_or_init(|| WorkerPool::new(self.config.resolved_thread_count()))
    }

    /// Encodes `frame` into a complete TLV sample.
    pub fn encode(&mut self, frame: &Frame) -> Result<Vec<u8>> {
        if !frame.is_keyframe && self.keyframe.is_none() {
            return Err(CineformError::MissingReference);
        }
        encode::encode_frame(self, frame)
    }

    /// Decodes one sample, converting the reconstructed pixels to `out_format`. Fails with
    /// [`CineformError::MissingReference`] if the sample is a difference frame and no keyframe
    /// has been decoded yet this session.
    pub fn decode(&mut self, sample: &[u8], out_format: PixelFormat) -> Result<Frame> {
        decode::decode_frame(self, sample, out_format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_has_no_stored_keyframe() {
        let session = Session::new(SessionConfig::new());
        assert!(session.keyframe.is_none());
    }

    #[test]
    fn pool_is_created_lazily_and_reused() {
        let session = Session::new(SessionConfig::new().with_thread_limit(2));
        let first = session.pool() as *const WorkerPool;
        let second = session.pool() as *const WorkerPool;
        assert_eq!(first, second);
    }
}
