// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! External metadata layer files: a clip-GUID-named file
//! under a LUT search path, re-read at most every 100ms.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use cineform_core::errors::Result;

use crate::layers::ChannelDelta;
use crate::parse::parse_metadata;
use crate::data::PartialCfhdData;

/// The decoder re-reads external layers no more often than this.
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// Formats a clip GUID as the filename stem: `%08X-%04X-%04X-%02X%02X-%02X%02X%02X%02X%02X%02X`.
pub fn guid_filename_stem(guid: [u8; 16]) -> String {
    format!(
        "{:02X}{:02X}{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
        guid[0], guid[1], guid[2], guid[3],
        guid[4], guid[5],
        guid[6], guid[7],
        guid[8], guid[9],
        guid[10], guid[11], guid[12], guid[13], guid[14], guid[15],
    )
}

/// The file extension a channel delta maps to: `.colr` for the common layer, `.col1`/`.col2`
/// for per-eye overrides.
fn extension_for_channel(channel: ChannelDelta) -> &'static str {
    match channel {
        1 => "col1",
        2 => "col2",
        _ => "colr",
    }
}

/// One external-file-backed layer: a search path, the clip GUID it was last resolved for, and
/// the wall-clock time it was last read.
#[derive(Clone, Debug, Default)]
pub struct ExternalLayerSource {
    search_paths: Vec<PathBuf>,
    last_read: Option<Instant>,
    last_guid: Option<[u8; 16]>,
}

impl ExternalLayerSource {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        ExternalLayerSource { search_paths, last_read: None, last_guid: None }
    }

    fn resolve_path(&self, stem: &str, ext: &str) -> Option<PathBuf> {
        self.search_paths.iter().map(|dir| dir.join(format!("{stem}.{ext}"))).find(|p| p.exists())
    }

    /// Re-reads this source's files if the refresh interval has elapsed or the clip GUID changed
    ///. Returns `None` when no refresh was needed; `Some(None)` when a refresh ran but no
    /// file was found for this channel; `Some(Some(data))` on a successful read.
    ///
    /// `now` is threaded in by the caller rather than sampled internally, so refresh timing is
    /// deterministic and test-controllable.
    pub fn refresh(
        &mut self,
        now: Instant,
        clip_guid: [u8; 16],
        channel: ChannelDelta,
    ) -> Result<Option<Option<PartialCfhdData>>> {
        let guid_changed = self.last_guid != Some(clip_guid);
        let due = self.last_read.map_or(true, |t| now.duration_since(t) >= REFRESH_INTERVAL);

        if !guid_changed && !due {
            return Ok(None);
        }

        self.last_read = Some(now);
        self.last_guid = Some(clip_guid);

        let stem = guid_filename_stem(clip_guid);
        let ext = extension_for_channel(channel);
        let Some(path) = self.resolve_path(&stem, ext) else {
            return Ok(Some(None));
        };

        let buf = read_file(&path)?;
        Ok(Some(Some(parse_metadata(&buf)?)))
    }

    /// Reads the universal override file (`override.colr`), ignoring the refresh interval: it
    /// must be re-checked as soon as it is removed and the interval has elapsed, same as a
    /// GUID-keyed layer.
    pub fn read_override(&self) -> Result<Option<PartialCfhdData>> {
        let Some(path) = self.search_paths.iter().map(|dir| dir.join("override.colr")).find(|p| p.exists()) else {
            return Ok(None);
        };
        let buf = read_file(&path)?;
        Ok(Some(parse_metadata(&buf)?))
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    Ok(fs::read(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guid_filename_matches_spec_pattern() {
        let guid = [
            0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef,
        ];
        let stem = guid_filename_stem(guid);
        assert_eq!(stem, "01234567-89AB-CDEF-0123-456789ABCDEF");
    }

    #[test]
    fn refresh_is_skipped_before_interval_elapses() {
        let mut source = ExternalLayerSource::new(vec![]);
        let t0 = Instant::now();
        let guid = [1u8; 16];

        // First call for a new GUID always refreshes.
        assert!(source.refresh(t0, guid, 0).unwrap().is_some());
        // Immediately again: not due, same GUID.
        assert!(source.refresh(t0, guid, 0).unwrap().is_none());
        // After the interval: due again.
        assert!(source.refresh(t0 + REFRESH_INTERVAL, guid, 0).unwrap().is_some());
    }

    #[test]
    fn guid_change_forces_refresh_even_if_not_due() {
        let mut source = ExternalLayerSource::new(vec![]);
        let t0 = Instant::now();
        source.refresh(t0, [1u8; 16], 0).unwrap();
        assert!(source.refresh(t0, [2u8; 16], 0).unwrap().is_some());
    }
}
