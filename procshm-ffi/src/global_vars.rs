// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::utils::name_from_ptr;
use crate::{wrap_with_ffi_result, wrap_with_void_ffi_result, GetResult, Result, VoidResult};
use function_name::named;
use procshm::config::Config;
use procshm::{GlobalVarStore, VarError};
use std::ffi::c_char;
use std::sync::{Mutex, PoisonError};

/// The handles opened on behalf of the host, shared by all of its threads.
static STORE: Mutex<Option<GlobalVarStore>> = Mutex::new(None);

fn with_store<T>(
    f: impl FnOnce(&mut GlobalVarStore) -> std::result::Result<T, VarError>,
) -> std::result::Result<T, VarError> {
    let mut guard = STORE.lock().unwrap_or_else(PoisonError::into_inner);
    let store = guard.get_or_insert_with(|| GlobalVarStore::from_config(&Config::get()));
    f(store)
}

/// Whether a variable called `name` exists, in this or any other process.
///
/// # Safety
/// `name` must be null or a valid NUL terminated string.
#[no_mangle]
#[must_use]
#[named]
pub unsafe extern "C" fn procshm_exists_global_variable(name: *const c_char) -> Result<bool> {
    wrap_with_ffi_result!({
        let name = name_from_ptr(name)?;
        anyhow::Ok(with_store(|store| store.exists(name))?)
    })
}

/// Stores `value` under `name`, creating the variable if needed.
///
/// # Safety
/// `name` must be null or a valid NUL terminated string.
#[no_mangle]
#[must_use]
#[named]
pub unsafe extern "C" fn procshm_set_global_variable(
    name: *const c_char,
    value: i32,
) -> VoidResult {
    wrap_with_void_ffi_result!({
        let name = name_from_ptr(name)?;
        with_store(|store| store.set(name, value))?;
    })
}

/// Reads the variable called `name`. A variable nobody set is `Missing`, and
/// reading it does not create it.
///
/// # Safety
/// `name` must be null or a valid NUL terminated string.
#[no_mangle]
#[must_use]
#[named]
pub unsafe extern "C" fn procshm_get_global_variable(name: *const c_char) -> GetResult {
    wrap_with_ffi_result!({
        let name = name_from_ptr(name)?;
        anyhow::Ok(with_store(|store| store.get(name))?)
    })
}

/// Releases this process' handle to `name` and removes the variable.
///
/// # Safety
/// `name` must be null or a valid NUL terminated string.
#[no_mangle]
#[must_use]
#[named]
pub unsafe extern "C" fn procshm_unset_global_variable(name: *const c_char) -> VoidResult {
    wrap_with_void_ffi_result!({
        let name = name_from_ptr(name)?;
        with_store(|store| store.unset(name))?;
    })
}

#[no_mangle]
pub extern "C" fn procshm_name_max_len() -> usize {
    procshm::name_max_len()
}

/// Unmaps every variable opened through this library. Variables are not
/// removed: on POSIX systems they stay readable by name.
#[no_mangle]
pub extern "C" fn procshm_release_global_variables() {
    let store = STORE.lock().unwrap_or_else(PoisonError::into_inner).take();
    drop(store);
}

#[cfg(test)]
mod tests {
    use super::*;
    use procshm::ErrorKind;
    use std::ffi::CString;

    fn unique(tag: &str) -> CString {
        CString::new(format!("procshm-ffi-{tag}-{}", std::process::id())).unwrap()
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn set_get_unset() {
        let name = unique("basic");
        unsafe {
            assert!(matches!(
                procshm_exists_global_variable(name.as_ptr()),
                Result::Ok(false)
            ));
            assert!(matches!(
                procshm_get_global_variable(name.as_ptr()),
                GetResult::Missing
            ));

            assert!(matches!(
                procshm_set_global_variable(name.as_ptr(), -3),
                VoidResult::Ok(_)
            ));
            assert!(matches!(
                procshm_get_global_variable(name.as_ptr()),
                GetResult::Value(-3)
            ));
            assert!(matches!(
                procshm_exists_global_variable(name.as_ptr()),
                Result::Ok(true)
            ));

            assert!(matches!(
                procshm_unset_global_variable(name.as_ptr()),
                VoidResult::Ok(_)
            ));
            assert!(matches!(
                procshm_exists_global_variable(name.as_ptr()),
                Result::Ok(false)
            ));
        }
    }

    #[test]
    fn bad_names_are_reported() {
        let result = unsafe { procshm_set_global_variable(std::ptr::null(), 1) };
        let VoidResult::Err(err) = result else {
            panic!("null name accepted");
        };
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err
            .to_string()
            .starts_with("procshm_set_global_variable failed"));

        let empty = CString::default();
        let GetResult::Err(err) = (unsafe { procshm_get_global_variable(empty.as_ptr()) }) else {
            panic!("empty name accepted");
        };
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    #[cfg(unix)]
    #[cfg_attr(miri, ignore)]
    fn release_keeps_posix_segments() {
        let name = unique("release");
        unsafe {
            assert!(matches!(
                procshm_set_global_variable(name.as_ptr(), 11),
                VoidResult::Ok(_)
            ));
            procshm_release_global_variables();
            assert!(matches!(
                procshm_get_global_variable(name.as_ptr()),
                GetResult::Value(11)
            ));
            assert!(matches!(
                procshm_unset_global_variable(name.as_ptr()),
                VoidResult::Ok(_)
            ));
        }
    }
}
