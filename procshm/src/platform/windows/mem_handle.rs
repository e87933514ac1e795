// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::{win32_to_io, SegmentOp, VarError};
use crate::name::VarName;
use crate::platform::{
    check_size, Access, MappedMem, MemoryHandle, Probe, SegmentBackend, VALUE_SIZE,
};
use std::io;
use std::os::windows::io::{AsRawHandle, FromRawHandle, OwnedHandle};
use std::ptr::NonNull;
use tracing::debug;
use windows::core::PCSTR;
use windows::Win32::Foundation::{
    GetLastError, ERROR_ACCESS_DENIED, ERROR_ALREADY_EXISTS, ERROR_FILE_NOT_FOUND, HANDLE,
    INVALID_HANDLE_VALUE,
};
use windows::Win32::System::Memory::{
    CreateFileMappingA, MapViewOfFile, OpenFileMappingA, UnmapViewOfFile, FILE_MAP,
    FILE_MAP_ALL_ACCESS, FILE_MAP_READ, MEMORY_MAPPED_VIEW_ADDRESS, PAGE_READWRITE,
};

/// A named file mapping backed by the paging file. Windows destroys the
/// mapping once the last handle to it closes, in any process.
#[derive(Debug)]
pub struct NamedMappingHandle {
    handle: OwnedHandle,
    size: usize,
    access: Access,
}

impl MemoryHandle for NamedMappingHandle {
    fn get_size(&self) -> usize {
        self.size
    }

    fn access(&self) -> Access {
        self.access
    }

    fn is_linked(&self) -> io::Result<bool> {
        // a mapping cannot go away while we hold a handle to it
        Ok(true)
    }
}

impl NamedMappingHandle {
    fn new(handle: HANDLE, access: Access) -> NamedMappingHandle {
        NamedMappingHandle {
            // Safety: the handle was just returned by a successful Create/OpenFileMapping call
            handle: unsafe { OwnedHandle::from_raw_handle(handle.0) },
            size: VALUE_SIZE,
            access,
        }
    }

    fn raw(&self) -> HANDLE {
        HANDLE(self.handle.as_raw_handle())
    }

    pub fn map(self) -> io::Result<MappedMem<NamedMappingHandle>> {
        let desired: FILE_MAP = match self.access {
            Access::ReadOnly => FILE_MAP_READ,
            Access::ReadWrite => FILE_MAP_ALL_ACCESS,
        };
        let len = check_size(self.size)?;
        let view = unsafe { MapViewOfFile(self.raw(), desired, 0, 0, len) };
        match NonNull::new(view.Value) {
            Some(ptr) => Ok(MappedMem { ptr, mem: self }),
            None => Err(win32_to_io(windows::core::Error::from_win32())),
        }
    }
}

pub(crate) fn munmap_handle<T: MemoryHandle>(mapped: &mut MappedMem<T>) {
    unsafe {
        _ = UnmapViewOfFile(MEMORY_MAPPED_VIEW_ADDRESS {
            Value: mapped.ptr.as_ptr(),
        });
    }
}

/// Named file mappings in the session namespace (`CreateFileMappingA`).
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsShm;

impl WindowsShm {
    fn open(name: &VarName, access: Access) -> windows::core::Result<Option<HANDLE>> {
        let desired = match access {
            Access::ReadOnly => FILE_MAP_READ,
            Access::ReadWrite => FILE_MAP_ALL_ACCESS,
        };
        let path = PCSTR(name.os_name().as_ptr() as *const u8);
        match unsafe { OpenFileMappingA(desired.0, false, path) } {
            Ok(handle) => Ok(Some(handle)),
            Err(e) if e.code() == ERROR_FILE_NOT_FOUND.to_hresult() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl SegmentBackend for WindowsShm {
    type Segment = MappedMem<NamedMappingHandle>;

    fn probe(&self, name: &VarName) -> Result<Probe, VarError> {
        match Self::open(name, Access::ReadOnly) {
            Ok(Some(handle)) => {
                drop(NamedMappingHandle::new(handle, Access::ReadOnly));
                Ok(Probe::Present)
            }
            Ok(None) => Ok(Probe::Absent),
            Err(e) if e.code() == ERROR_ACCESS_DENIED.to_hresult() => Ok(Probe::Present),
            Err(e) => Err(VarError::segment(
                name.as_str(),
                SegmentOp::Open,
                win32_to_io(e),
            )),
        }
    }

    fn open_or_create(&self, name: &VarName) -> Result<Self::Segment, VarError> {
        let path = PCSTR(name.os_name().as_ptr() as *const u8);
        let handle = unsafe {
            CreateFileMappingA(
                INVALID_HANDLE_VALUE,
                None,
                PAGE_READWRITE,
                0,
                VALUE_SIZE as u32,
                path,
            )
        }
        .map_err(|e| VarError::segment(name.as_str(), SegmentOp::Create, win32_to_io(e)))?;
        if unsafe { GetLastError() } != ERROR_ALREADY_EXISTS {
            debug!("Created file mapping {name}");
        }

        NamedMappingHandle::new(handle, Access::ReadWrite)
            .map()
            .map_err(|e| VarError::segment(name.as_str(), SegmentOp::Map, e))
    }

    fn open_read_only(&self, name: &VarName) -> Result<Option<Self::Segment>, VarError> {
        let handle = match Self::open(name, Access::ReadOnly) {
            Ok(Some(handle)) => handle,
            Ok(None) => return Ok(None),
            Err(e) => {
                return Err(VarError::segment(
                    name.as_str(),
                    SegmentOp::Open,
                    win32_to_io(e),
                ))
            }
        };

        NamedMappingHandle::new(handle, Access::ReadOnly)
            .map()
            .map(Some)
            .map_err(|e| VarError::segment(name.as_str(), SegmentOp::Map, e))
    }

    fn remove(&self, name: &VarName) -> Result<(), VarError> {
        // There is no unlink for file mappings: dropping our handle is all we can do.
        debug!("File mapping {name} is released once its last handle closes");
        Ok(())
    }
}
