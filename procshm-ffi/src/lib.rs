// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! C ABI over `procshm`. Every symbol is prefixed `procshm_`; fallible calls
//! return a `#[repr(C)]` result carrying a [`Error`] which the caller releases
//! with `procshm_Error_drop`.

mod error;
mod global_vars;
mod process;
mod result;
pub mod utils;

pub use error::*;
pub use global_vars::*;
pub use process::*;
pub use result::*;
