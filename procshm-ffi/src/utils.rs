// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::Error;
use procshm::{ErrorKind, VarError};
use std::ffi::{c_char, CStr};

/// Wraps a C-FFI function in standard form
/// Expects the function to return a result type that implements into and to be decorated with
/// #[named].
#[macro_export]
macro_rules! wrap_with_ffi_result {
    ($body:block) => {{
        use std::panic::{catch_unwind, AssertUnwindSafe};

        catch_unwind(AssertUnwindSafe(|| {
            use anyhow::Context;
            (|| $body)()
                .context(concat!(function_name!(), " failed"))
                .into()
        }))
        .unwrap_or_else(|e| $crate::utils::handle_panic_error(e, function_name!()).into())
    }};
}

/// Wraps a C-FFI function in standard form.
/// Expects the function to return a VoidResult and to be decorated with #[named].
#[macro_export]
macro_rules! wrap_with_void_ffi_result {
    ($body:block) => {{
        use std::panic::{catch_unwind, AssertUnwindSafe};

        catch_unwind(AssertUnwindSafe(|| {
            use anyhow::Context;
            (|| {
                $body;
                anyhow::Ok(())
            })()
            .context(concat!(function_name!(), " failed"))
            .into()
        }))
        .unwrap_or_else(|e| $crate::utils::handle_panic_error(e, function_name!()).into())
    }};
}

/// Turns a panic payload caught at the boundary into an error for the caller.
pub fn handle_panic_error(
    error: Box<dyn std::any::Any + Send + 'static>,
    function_name: &str,
) -> Error {
    let reason = if let Some(s) = error.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = error.downcast_ref::<&str>() {
        *s
    } else {
        "Unable to retrieve panic context"
    };
    Error::new(
        ErrorKind::CreationFailure,
        &format!("{function_name} failed: (panic) {reason}"),
    )
}

/// Borrows a NUL terminated name from the caller.
///
/// # Safety
/// `name` must be null or point to a NUL terminated string which outlives `'a`.
pub unsafe fn name_from_ptr<'a>(name: *const c_char) -> Result<&'a str, VarError> {
    if name.is_null() {
        return Err(VarError::InvalidInput {
            name: String::new(),
            reason: "name is a null pointer".to_owned(),
        });
    }
    let name = CStr::from_ptr(name);
    name.to_str().map_err(|_| VarError::InvalidInput {
        name: name.to_string_lossy().into_owned(),
        reason: "name is not valid UTF-8".to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_non_utf8_names() {
        let err = unsafe { name_from_ptr(std::ptr::null()) }.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let bytes = b"caf\xe9\0";
        let err = unsafe { name_from_ptr(bytes.as_ptr() as *const c_char) }.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let name = unsafe { name_from_ptr(c"counter".as_ptr()) }.unwrap();
        assert_eq!(name, "counter");
    }

    #[test]
    fn panics_become_errors() {
        let err = handle_panic_error(Box::new("boom"), "procshm_test");
        assert_eq!(err.kind(), ErrorKind::CreationFailure);
        assert_eq!(err.to_string(), "procshm_test failed: (panic) boom");
    }
}
