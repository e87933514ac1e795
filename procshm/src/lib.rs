// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! Process control and cross-process state for host runtimes.
//!
//! - [`GlobalVarStore`]: named `i32` variables living in OS shared memory,
//!   visible to every process which knows the name.
//! - [`process`]: interrupting a process, detaching from the controlling
//!   terminal, and checking whether a pid is alive.

pub mod config;
mod error;
pub mod log;
mod name;
pub mod platform;
pub mod process;
mod store;

pub use error::{ErrorKind, ProcessError, SegmentOp, VarError};
pub use name::{name_max_len, VarName};
pub use store::GlobalVarStore;
