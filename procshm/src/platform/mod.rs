// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! OS shared memory primitives behind the variable store.
//!
//! Each platform provides a [`SegmentBackend`]: on Unix segments are POSIX shm
//! objects which persist until unlinked, on Windows they are named file
//! mappings backed by the paging file, destroyed by the OS once the last handle
//! to them closes in any process. [`DefaultBackend`] is the one for the build
//! target.

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

mod mem_handle;
pub use mem_handle::*;

#[cfg(unix)]
pub use unix::*;
#[cfg(windows)]
pub use windows::*;

use crate::error::VarError;
use crate::name::VarName;
use std::io;

#[cfg(unix)]
pub type DefaultBackend = UnixShm;
#[cfg(windows)]
pub type DefaultBackend = WindowsShm;

/// Outcome of looking for a segment without opening it for use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Present,
    Absent,
}

/// A live mapping of one stored value.
pub trait MappedSegment {
    fn load(&self) -> i32;
    /// Fails with `PermissionDenied` on read-only mappings.
    fn store(&mut self, value: i32) -> io::Result<()>;
    fn is_writable(&self) -> bool;
    /// False once the segment was removed from the OS namespace, by any
    /// process. The mapping stays readable but nobody else will see it.
    fn is_linked(&self) -> io::Result<bool>;
}

pub trait SegmentBackend {
    type Segment: MappedSegment;

    /// Checks for the segment. Never creates it, and releases whatever it opened.
    fn probe(&self, name: &VarName) -> Result<Probe, VarError>;

    /// Creates the segment sized for one value, or opens it if it exists, and
    /// maps it read-write.
    fn open_or_create(&self, name: &VarName) -> Result<Self::Segment, VarError>;

    /// Maps an existing segment read-only. `None` when there is no segment, or
    /// when its creator has not sized it yet.
    fn open_read_only(&self, name: &VarName) -> Result<Option<Self::Segment>, VarError>;

    /// Marks the segment for destruction. Missing segments are not an error.
    fn remove(&self, name: &VarName) -> Result<(), VarError>;
}
