// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::ProcessError;
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::{getppid, setsid, Pid};
use tracing::{debug, warn};

fn to_pid(pid: u64) -> Result<Pid, ProcessError> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Ok(Pid::from_raw(raw)),
        _ => Err(ProcessError::InvalidPid(pid)),
    }
}

/// Sends SIGINT to `pid`. Returns whether the signal was delivered.
pub fn send_interrupt(pid: u64) -> bool {
    let Ok(target) = to_pid(pid) else {
        return false;
    };
    match kill(target, Signal::SIGINT) {
        Ok(()) => true,
        Err(e) => {
            debug!("Could not interrupt process {pid}: {e}");
            false
        }
    }
}

/// Starts a new session, leaving the controlling terminal of the current one.
pub fn detach_from_controller() -> Result<(), ProcessError> {
    if getppid() == Pid::from_raw(1) {
        warn!("The current process is already parented by init");
    }
    setsid().map_err(|e| ProcessError::DetachFailed(e.into()))?;
    debug!("Detached into a new session");
    Ok(())
}

/// Whether `pid` names a live process. A process we may not signal is alive.
pub fn is_alive(pid: u64) -> Result<bool, ProcessError> {
    match kill(to_pid(pid)?, None) {
        Ok(()) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        Err(Errno::EPERM) => Ok(true),
        Err(e) => Err(ProcessError::StatusCheckFailed {
            pid,
            source: e.into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use nix::sys::signal::{signal, SigHandler};
    use std::os::unix::process::{CommandExt, ExitStatusExt};
    use std::process::Command;

    #[test]
    #[cfg_attr(miri, ignore)]
    fn running_and_reaped_children() {
        let mut command = Command::new("sleep");
        command.arg("30");
        // background jobs inherit an ignored SIGINT
        unsafe {
            command.pre_exec(|| {
                signal(Signal::SIGINT, SigHandler::SigDfl)?;
                Ok(())
            });
        }
        let mut child = command.spawn().unwrap();
        let pid = u64::from(child.id());
        assert!(is_alive(pid).unwrap());

        assert!(send_interrupt(pid));
        let status = child.wait().unwrap();
        assert_eq!(status.signal(), Some(libc::SIGINT));
        assert!(!is_alive(pid).unwrap());
        assert!(!send_interrupt(pid));
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn init_is_alive() {
        // whether we may signal it or not
        assert!(is_alive(1).unwrap());
        assert!(is_alive(u64::from(std::process::id())).unwrap());
    }

    #[test]
    fn out_of_range_pids() {
        for pid in [0, u64::from(u32::MAX), u64::MAX] {
            assert_eq!(is_alive(pid).unwrap_err().kind(), ErrorKind::InvalidInput);
            assert!(!send_interrupt(pid));
        }
    }
}
