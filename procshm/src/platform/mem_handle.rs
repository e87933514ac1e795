// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::platform::{munmap_handle, MappedSegment};
use std::ffi::c_void;
use std::io;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicI32, Ordering};

/// Bytes occupied by a stored value.
pub const VALUE_SIZE: usize = std::mem::size_of::<i32>();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

pub trait MemoryHandle {
    fn get_size(&self) -> usize;
    fn access(&self) -> Access;
    fn is_linked(&self) -> io::Result<bool>;
}

/// A segment handle together with its mapping into this process.
///
/// Dropping it unmaps the view first, then releases the handle.
pub struct MappedMem<T>
where
    T: MemoryHandle,
{
    pub(crate) ptr: NonNull<c_void>,
    pub(crate) mem: T,
}

impl<T: MemoryHandle> MappedMem<T> {
    pub fn get_size(&self) -> usize {
        self.mem.get_size()
    }

    fn value(&self) -> &AtomicI32 {
        // Safety: mappings are page aligned and at least VALUE_SIZE long, see `check_size`.
        unsafe { &*(self.ptr.as_ptr() as *const AtomicI32) }
    }
}

impl<T: MemoryHandle> MappedSegment for MappedMem<T> {
    fn load(&self) -> i32 {
        self.value().load(Ordering::Acquire)
    }

    fn store(&mut self, value: i32) -> io::Result<()> {
        if !self.is_writable() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "segment is mapped read-only",
            ));
        }
        self.value().store(value, Ordering::Release);
        Ok(())
    }

    fn is_writable(&self) -> bool {
        self.mem.access() == Access::ReadWrite
    }

    fn is_linked(&self) -> io::Result<bool> {
        self.mem.is_linked()
    }
}

/// Rejects segments too small to hold a value; mapping them would fault on access.
pub(crate) fn check_size(size: usize) -> io::Result<usize> {
    if size < VALUE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("segment holds {size} bytes, expected at least {VALUE_SIZE}"),
        ));
    }
    Ok(size)
}

impl<T> Drop for MappedMem<T>
where
    T: MemoryHandle,
{
    fn drop(&mut self) {
        munmap_handle(self);
    }
}

unsafe impl<T> Send for MappedMem<T> where T: MemoryHandle + Send {}
unsafe impl<T> Sync for MappedMem<T> where T: MemoryHandle + Sync {}
