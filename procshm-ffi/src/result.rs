// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::Error;

/// A generic result type for when an operation may fail,
/// but there's nothing to return in the case of success.
#[repr(C)]
#[derive(Debug)]
pub enum VoidResult {
    Ok(
        /// Do not use the value of Ok. This value only exists to overcome
        /// Rust -> C code generation.
        bool,
    ),
    Err(Error),
}

impl From<anyhow::Result<()>> for VoidResult {
    fn from(value: anyhow::Result<()>) -> Self {
        match value {
            Ok(_) => Self::Ok(true),
            Err(err) => Self::Err(err.into()),
        }
    }
}

/// A generic result type for when an operation may fail,
/// or may return <T> in case of success.
#[repr(C)]
#[derive(Debug)]
pub enum Result<T> {
    Ok(T),
    Err(Error),
}

impl<T> From<anyhow::Result<T>> for Result<T> {
    fn from(value: anyhow::Result<T>) -> Self {
        match value {
            Ok(v) => Self::Ok(v),
            Err(err) => Self::Err(err.into()),
        }
    }
}

/// Outcome of reading a variable. `Missing` is distinct from every value, so
/// callers never have to reserve an integer as "not set".
#[repr(C)]
#[derive(Debug)]
pub enum GetResult {
    Value(i32),
    Missing,
    Err(Error),
}

impl From<anyhow::Result<Option<i32>>> for GetResult {
    fn from(value: anyhow::Result<Option<i32>>) -> Self {
        match value {
            Ok(Some(v)) => Self::Value(v),
            Ok(None) => Self::Missing,
            Err(err) => Self::Err(err.into()),
        }
    }
}

impl From<Error> for VoidResult {
    fn from(err: Error) -> Self {
        Self::Err(err)
    }
}

impl<T> From<Error> for Result<T> {
    fn from(err: Error) -> Self {
        Self::Err(err)
    }
}

impl From<Error> for GetResult {
    fn from(err: Error) -> Self {
        Self::Err(err)
    }
}
