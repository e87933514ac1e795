// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::ProcessError;
use std::os::windows::io::{AsRawHandle, FromRawHandle, OwnedHandle};
use tracing::debug;
use windows::Win32::Foundation::{
    ERROR_ACCESS_DENIED, ERROR_GEN_FAILURE, HANDLE, WAIT_TIMEOUT,
};
use windows::Win32::System::Console::{
    AllocConsole, AttachConsole, FreeConsole, GenerateConsoleCtrlEvent, SetConsoleCtrlHandler,
    CTRL_C_EVENT,
};
use windows::Win32::System::Threading::{
    GetCurrentProcessId, OpenProcess, WaitForSingleObject, PROCESS_SYNCHRONIZE,
};

fn to_pid(pid: u64) -> Result<u32, ProcessError> {
    u32::try_from(pid).map_err(|_| ProcessError::InvalidPid(pid))
}

/// Delivers Ctrl-C to the console of `pid`. Returns whether the event was generated.
///
/// Only one console can be attached at a time, so this leaves our own console,
/// attaches to the target's, and comes back afterwards.
pub fn send_interrupt(pid: u64) -> bool {
    let Ok(target) = to_pid(pid) else {
        return false;
    };
    let own_pid = unsafe { GetCurrentProcessId() };
    // AttachConsole is refused while we still have one
    let detached = unsafe { FreeConsole() }.is_ok();

    let mut sent = false;
    if unsafe { AttachConsole(target) }.is_ok() {
        unsafe {
            // ignore the Ctrl-C ourselves, we are now on the same console; never revert this
            _ = SetConsoleCtrlHandler(None, true);
            sent = GenerateConsoleCtrlEvent(CTRL_C_EVENT, 0).is_ok();
            _ = FreeConsole();
        }
    } else {
        debug!("Could not attach to the console of process {pid}");
    }

    if detached {
        if let Err(e) = unsafe { AttachConsole(own_pid) } {
            // our console went away with us detaching from it
            if e.code() == ERROR_GEN_FAILURE.to_hresult() {
                _ = unsafe { AllocConsole() };
            }
        }
    }
    sent
}

/// Releases the console of the current process. Having none is not an error.
pub fn detach_from_controller() -> Result<(), ProcessError> {
    if let Err(e) = unsafe { FreeConsole() } {
        debug!("No console to detach from: {e}");
    }
    Ok(())
}

/// Whether `pid` names a running process. A process we may not open is alive.
pub fn is_alive(pid: u64) -> Result<bool, ProcessError> {
    let target = to_pid(pid)?;
    let process = match unsafe { OpenProcess(PROCESS_SYNCHRONIZE, false, target) } {
        Ok(handle) => unsafe { OwnedHandle::from_raw_handle(handle.0) },
        Err(e) if e.code() == ERROR_ACCESS_DENIED.to_hresult() => return Ok(true),
        Err(_) => return Ok(false),
    };
    let wait = unsafe { WaitForSingleObject(HANDLE(process.as_raw_handle()), 0) };
    Ok(wait == WAIT_TIMEOUT)
}
