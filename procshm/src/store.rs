// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::{SegmentOp, VarError};
use crate::name::VarName;
use crate::platform::{DefaultBackend, MappedSegment, Probe, SegmentBackend};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

/// Named integer variables shared between processes.
///
/// Every name maps to one OS shared memory segment holding a single `i32`.
/// Segments are opened lazily and the resulting mappings are kept for the
/// lifetime of the store, so repeated reads and writes from this process do
/// not go back to the OS. There is no locking: concurrent writers from
/// different processes race, and the last write wins.
///
/// A name in the cache always has a live mapping. Nothing is cached when
/// opening or mapping fails half-way. Mappings of segments another process
/// removed are dropped on the next `set` or `get` of that name.
///
/// What happens to a segment once every handle to it is gone depends on the
/// platform: POSIX shm objects persist until [`unset`](Self::unset) unlinks
/// them, Windows file mappings disappear with their last handle.
pub struct GlobalVarStore<B: SegmentBackend = DefaultBackend> {
    backend: B,
    segments: HashMap<String, B::Segment>,
}

impl Default for GlobalVarStore {
    fn default() -> Self {
        GlobalVarStore::with_backend(DefaultBackend::default())
    }
}

impl GlobalVarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store creating segments with the permissions from `config`.
    #[cfg(unix)]
    pub fn from_config(config: &crate::config::Config) -> Self {
        GlobalVarStore::with_backend(crate::platform::UnixShm::with_mode(config.segment_mode))
    }

    #[cfg(windows)]
    pub fn from_config(_config: &crate::config::Config) -> Self {
        Self::default()
    }
}

impl<B: SegmentBackend> GlobalVarStore<B> {
    pub fn with_backend(backend: B) -> Self {
        GlobalVarStore {
            backend,
            segments: HashMap::new(),
        }
    }

    /// Whether a segment for `name` exists anywhere on the system. Does not
    /// create it, and does not keep anything open.
    pub fn exists(&self, name: &str) -> Result<bool, VarError> {
        let name = VarName::new(name)?;
        Ok(self.backend.probe(&name)? == Probe::Present)
    }

    /// Drops the cached mapping of `name` if its segment was removed meanwhile.
    fn evict_if_removed(&mut self, name: &VarName) -> Result<(), VarError> {
        let removed = match self.segments.get(name.as_str()) {
            Some(segment) => !segment
                .is_linked()
                .map_err(|e| VarError::segment(name.as_str(), SegmentOp::Inspect, e))?,
            None => false,
        };
        if removed {
            self.segments.remove(name.as_str());
            debug!("Dropped mapping of shared variable {name}, its segment was removed");
        }
        Ok(())
    }

    /// Stores `value` under `name`, creating the segment on first use.
    pub fn set(&mut self, name: &str, value: i32) -> Result<(), VarError> {
        let name = VarName::new(name)?;
        self.evict_if_removed(&name)?;
        let segment = match self.segments.entry(name.as_str().to_owned()) {
            Entry::Occupied(entry) if entry.get().is_writable() => entry.into_mut(),
            // A read-only mapping left by `get` cannot be upgraded in place.
            Entry::Occupied(mut entry) => {
                entry.insert(self.backend.open_or_create(&name)?);
                debug!("Reopened shared variable {name} for writing");
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                let segment = entry.insert(self.backend.open_or_create(&name)?);
                debug!("Opened shared variable {name} for writing");
                segment
            }
        };

        segment
            .store(value)
            .map_err(|e| VarError::segment(name.as_str(), SegmentOp::Map, e))
    }

    /// Reads the value stored under `name`, or `None` if nothing was ever set.
    /// Never creates a segment.
    pub fn get(&mut self, name: &str) -> Result<Option<i32>, VarError> {
        let name = VarName::new(name)?;
        self.evict_if_removed(&name)?;
        if let Some(segment) = self.segments.get(name.as_str()) {
            return Ok(Some(segment.load()));
        }

        let Some(segment) = self.backend.open_read_only(&name)? else {
            return Ok(None);
        };
        let value = segment.load();
        debug!("Opened shared variable {name} for reading");
        self.segments.insert(name.as_str().to_owned(), segment);
        Ok(Some(value))
    }

    /// Releases this process's mapping of `name` and marks the segment for
    /// destruction. Unsetting an unknown name does nothing.
    pub fn unset(&mut self, name: &str) -> Result<(), VarError> {
        let name = VarName::new(name)?;
        if self.segments.remove(name.as_str()).is_some() {
            debug!("Released shared variable {name}");
        }
        self.backend.remove(&name)
    }

    pub fn contains_cached(&self, name: &str) -> bool {
        VarName::new(name).is_ok_and(|name| self.segments.contains_key(name.as_str()))
    }

    pub fn cached_len(&self) -> usize {
        self.segments.len()
    }
}
