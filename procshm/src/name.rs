// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::VarError;
use std::ffi::{CStr, CString};
use std::fmt;

// Object name limits: PSHMNAMLEN on macOS, NAME_MAX elsewhere on Unix, MAX_PATH on Windows.
// One character of the Unix limits is reserved for the leading `/` of the POSIX object name.
#[cfg(target_os = "macos")]
const PLATFORM_NAME_MAX: usize = 31 - 1;
#[cfg(all(unix, not(target_os = "macos")))]
const PLATFORM_NAME_MAX: usize = 255 - 1;
#[cfg(windows)]
const PLATFORM_NAME_MAX: usize = windows::Win32::Foundation::MAX_PATH as usize;
#[cfg(not(any(unix, windows)))]
const PLATFORM_NAME_MAX: usize = 1024;

/// Longest variable name the shared memory namespace of this platform accepts.
pub const fn name_max_len() -> usize {
    PLATFORM_NAME_MAX
}

/// A validated variable name, along with the object name handed to the OS.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct VarName {
    name: String,
    os_name: CString,
}

impl VarName {
    pub fn new(name: &str) -> Result<VarName, VarError> {
        let bare = if cfg!(unix) {
            name.strip_prefix('/').unwrap_or(name)
        } else {
            name
        };

        if bare.is_empty() {
            return Err(VarError::invalid(name, "name is empty"));
        }
        if bare.len() > name_max_len() {
            return Err(VarError::invalid(
                name,
                format!(
                    "name is {} bytes long, the limit is {}",
                    bare.len(),
                    name_max_len()
                ),
            ));
        }
        if cfg!(unix) && bare.contains('/') {
            return Err(VarError::invalid(name, "name may not contain '/'"));
        }

        let os_name = if cfg!(unix) {
            format!("/{bare}")
        } else {
            bare.to_owned()
        };
        let os_name =
            CString::new(os_name).map_err(|_| VarError::invalid(name, "name contains a NUL byte"))?;

        Ok(VarName {
            name: bare.to_owned(),
            os_name,
        })
    }

    /// The name as the caller knows it, without any platform decoration.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn os_name(&self) -> &CStr {
        &self.os_name
    }
}

impl fmt::Debug for VarName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.name, f)
    }
}

impl fmt::Display for VarName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
