// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{wrap_with_ffi_result, wrap_with_void_ffi_result, Result, VoidResult};
use function_name::named;
use procshm::config::Config;
use procshm::process;

/// Interrupts process `pid` (SIGINT, or Ctrl-C on its console on Windows).
/// Returns whether the interrupt was delivered.
#[no_mangle]
pub extern "C" fn procshm_send_interrupt(pid: u64) -> bool {
    process::send_interrupt(pid)
}

/// Starts a new session on Unix, releases the console on Windows.
#[no_mangle]
#[must_use]
#[named]
pub extern "C" fn procshm_detach_from_controller() -> VoidResult {
    wrap_with_void_ffi_result!({
        process::detach_from_controller()?;
    })
}

#[no_mangle]
#[must_use]
#[named]
pub extern "C" fn procshm_is_process_alive(pid: u64) -> Result<bool> {
    wrap_with_ffi_result!({ anyhow::Ok(process::is_alive(pid)?) })
}

/// Sets up logging from the `PROCSHM_LOG_*` environment variables.
/// Fails when the host already installed a global logger.
#[no_mangle]
#[must_use]
#[named]
pub extern "C" fn procshm_enable_logging() -> VoidResult {
    wrap_with_void_ffi_result!({
        procshm::log::enable_logging(&Config::get())?;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use procshm::ErrorKind;

    #[test]
    #[cfg_attr(miri, ignore)]
    fn own_process_is_alive() {
        let pid = u64::from(std::process::id());
        assert!(matches!(procshm_is_process_alive(pid), Result::Ok(true)));
    }

    #[test]
    fn out_of_range_pid() {
        let Result::Err(err) = procshm_is_process_alive(u64::MAX) else {
            panic!("u64::MAX accepted as a pid");
        };
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(!procshm_send_interrupt(u64::MAX));
    }
}
