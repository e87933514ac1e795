// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::config::DEFAULT_SEGMENT_MODE;
use crate::error::{SegmentOp, VarError};
use crate::name::VarName;
use crate::platform::{
    check_size, Access, MappedMem, MemoryHandle, Probe, SegmentBackend, VALUE_SIZE,
};
use libc::off_t;
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::mman::{mmap, munmap, shm_open, shm_unlink, MapFlags, ProtFlags};
use nix::sys::stat::{fstat, Mode};
use nix::unistd::ftruncate;
use std::ffi::CStr;
use std::fs::File;
use std::io;
use std::num::NonZeroUsize;
use std::os::fd::{AsRawFd, OwnedFd};
use tracing::debug;

/// An open POSIX shm object. The object itself outlives the handle: only
/// `shm_unlink` removes it from the namespace.
#[derive(Debug)]
pub struct NamedShmHandle {
    fd: OwnedFd,
    size: usize,
    access: Access,
}

impl MemoryHandle for NamedShmHandle {
    fn get_size(&self) -> usize {
        self.size
    }

    fn access(&self) -> Access {
        self.access
    }

    fn is_linked(&self) -> io::Result<bool> {
        // macOS reports no link count for shm objects: treat every handle as
        // possibly stale and let the caller reopen by name.
        if cfg!(target_os = "macos") {
            return Ok(false);
        }
        Ok(fstat(self.fd.as_raw_fd())?.st_nlink > 0)
    }
}

fn segment_size(fd: OwnedFd) -> io::Result<(OwnedFd, usize)> {
    let file: File = fd.into();
    let size = file.metadata()?.len() as usize;
    Ok((file.into(), size))
}

impl NamedShmHandle {
    fn new(fd: OwnedFd, size: usize, access: Access) -> NamedShmHandle {
        NamedShmHandle { fd, size, access }
    }

    pub fn map(self) -> io::Result<MappedMem<NamedShmHandle>> {
        let len = NonZeroUsize::new(check_size(self.size)?)
            .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidData))?;
        let prot = match self.access {
            Access::ReadOnly => ProtFlags::PROT_READ,
            Access::ReadWrite => ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
        };
        let ptr = unsafe { mmap(None, len, prot, MapFlags::MAP_SHARED, &self.fd, 0)? };
        Ok(MappedMem { ptr, mem: self })
    }
}

pub(crate) fn munmap_handle<T: MemoryHandle>(mapped: &mut MappedMem<T>) {
    unsafe {
        _ = munmap(mapped.ptr, mapped.mem.get_size());
    }
}

/// POSIX shared memory objects, as created by `shm_open(3)`.
#[derive(Debug, Clone, Copy)]
pub struct UnixShm {
    mode: Mode,
}

impl Default for UnixShm {
    fn default() -> Self {
        UnixShm::with_mode(DEFAULT_SEGMENT_MODE)
    }
}

impl UnixShm {
    /// `mode` holds the permission bits of created segments, before the umask.
    pub fn with_mode(mode: u32) -> UnixShm {
        UnixShm {
            mode: Mode::from_bits_truncate(mode as libc::mode_t),
        }
    }

    fn open(path: &CStr, flags: OFlag, mode: Mode) -> Result<Option<OwnedFd>, Errno> {
        match shm_open(path, flags, mode) {
            Ok(fd) => Ok(Some(fd)),
            Err(Errno::ENOENT) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl SegmentBackend for UnixShm {
    type Segment = MappedMem<NamedShmHandle>;

    fn probe(&self, name: &VarName) -> Result<Probe, VarError> {
        match Self::open(name.os_name(), OFlag::O_RDONLY, Mode::empty()) {
            Ok(Some(_)) => Ok(Probe::Present),
            Ok(None) => Ok(Probe::Absent),
            // the object is there, we just may not read it
            Err(Errno::EACCES) => Ok(Probe::Present),
            Err(e) => Err(VarError::segment(name.as_str(), SegmentOp::Open, e.into())),
        }
    }

    fn open_or_create(&self, name: &VarName) -> Result<Self::Segment, VarError> {
        let segment_err = |op, e: io::Error| VarError::segment(name.as_str(), op, e);

        let fd = shm_open(name.os_name(), OFlag::O_CREAT | OFlag::O_RDWR, self.mode)
            .map_err(|e| segment_err(SegmentOp::Create, e.into()))?;
        let (fd, mut size) = segment_size(fd).map_err(|e| segment_err(SegmentOp::Inspect, e))?;

        // Either freshly created, or created by someone who has not sized it yet.
        if size < VALUE_SIZE {
            ftruncate(&fd, VALUE_SIZE as off_t)
                .map_err(|e| segment_err(SegmentOp::Resize, e.into()))?;
            size = VALUE_SIZE;
            debug!("Sized shared memory segment {name} to {size} bytes");
        }

        NamedShmHandle::new(fd, size, Access::ReadWrite)
            .map()
            .map_err(|e| segment_err(SegmentOp::Map, e))
    }

    fn open_read_only(&self, name: &VarName) -> Result<Option<Self::Segment>, VarError> {
        let segment_err = |op, e: io::Error| VarError::segment(name.as_str(), op, e);

        let fd = match Self::open(name.os_name(), OFlag::O_RDONLY, Mode::empty()) {
            Ok(Some(fd)) => fd,
            Ok(None) => return Ok(None),
            Err(e) => return Err(segment_err(SegmentOp::Open, e.into())),
        };
        let (fd, size) = segment_size(fd).map_err(|e| segment_err(SegmentOp::Inspect, e))?;
        if size == 0 {
            debug!("Shared memory segment {name} exists but holds no value yet");
            return Ok(None);
        }

        NamedShmHandle::new(fd, size, Access::ReadOnly)
            .map()
            .map(Some)
            .map_err(|e| segment_err(SegmentOp::Map, e))
    }

    fn remove(&self, name: &VarName) -> Result<(), VarError> {
        match shm_unlink(name.os_name()) {
            Ok(()) => {
                debug!("Unlinked shared memory segment {name}");
                Ok(())
            }
            Err(Errno::ENOENT) => Ok(()),
            Err(e) => Err(VarError::segment(name.as_str(), SegmentOp::Remove, e.into())),
        }
    }
}
