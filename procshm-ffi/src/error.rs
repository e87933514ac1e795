// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use procshm::{ErrorKind, ProcessError, VarError};
use std::ffi::{c_char, CStr, CString};
use std::fmt::{Debug, Display, Formatter};
use std::io;
use std::ptr;

/// Please treat this as opaque; do not reach into it, and especially don't
/// write into it! The most relevant APIs are:
/// * `procshm_Error_message`, to get the message as a C string.
/// * `procshm_Error_kind`.
/// * `procshm_Error_drop`.
#[repr(C)]
pub struct Error {
    /// Owned, NUL terminated. Null once the error was dropped.
    message: *mut c_char,
    kind: ErrorKind,
}

impl Error {
    pub fn new(kind: ErrorKind, message: &str) -> Self {
        let message = CString::new(message.replace('\0', "\\0")).unwrap_or_default();
        Error {
            message: message.into_raw(),
            kind,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    fn message(&self) -> &CStr {
        if self.message.is_null() {
            return c"";
        }
        // Safety: message came from CString::into_raw and is only freed in Drop.
        unsafe { CStr::from_ptr(self.message) }
    }
}

impl Drop for Error {
    fn drop(&mut self) {
        if !self.message.is_null() {
            // Safety: see `message`; the pointer is nulled right after.
            drop(unsafe { CString::from_raw(self.message) });
            self.message = ptr::null_mut();
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message().to_string_lossy())
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("Error({:?}, \"{}\")", self.kind, self))
    }
}

impl From<anyhow::Error> for Error {
    fn from(value: anyhow::Error) -> Self {
        // Context wrappers still downcast to the error they wrap.
        let kind = if let Some(err) = value.downcast_ref::<VarError>() {
            err.kind()
        } else if let Some(err) = value.downcast_ref::<ProcessError>() {
            err.kind()
        } else if let Some(err) = value.downcast_ref::<io::Error>() {
            match err.kind() {
                io::ErrorKind::PermissionDenied => ErrorKind::PermissionFailure,
                io::ErrorKind::NotFound => ErrorKind::NotFound,
                _ => ErrorKind::CreationFailure,
            }
        } else {
            // set-up failures, such as a logger already being installed
            ErrorKind::CreationFailure
        };
        Self::new(kind, &format!("{value:#}"))
    }
}

/// Drops the error's message. The error may be dropped again, or inspected,
/// afterwards: it then has an empty message.
///
/// # Safety
///
/// Only pass null or a pointer to a valid, mutable `procshm_Error`.
#[no_mangle]
pub unsafe extern "C" fn procshm_Error_drop(error: Option<&mut Error>) {
    if let Some(err) = error {
        clear_error(err);
    }
}

/// Frees the message in place, keeping the kind.
pub fn clear_error(err: &mut Error) {
    // assigning drops the old error, the new one owns nothing
    *err = Error {
        message: ptr::null_mut(),
        kind: err.kind,
    };
}

/// Returns the error's message, valid until the error is dropped.
///
/// # Safety
/// Only pass null or a valid reference to a `procshm_Error`.
#[no_mangle]
pub unsafe extern "C" fn procshm_Error_message(error: Option<&Error>) -> *const c_char {
    match error {
        None => c"".as_ptr(),
        Some(err) => err.message().as_ptr(),
    }
}

/// Classifies the error. Invalid names and pids are `InvalidInput`; failures
/// with no more specific kind, like logging which cannot be set up, are
/// `CreationFailure`.
///
/// # Safety
/// Only pass a valid reference to a `procshm_Error`.
#[no_mangle]
pub unsafe extern "C" fn procshm_Error_kind(error: &Error) -> ErrorKind {
    error.kind
}
