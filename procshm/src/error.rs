// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::io;
use thiserror::Error;

/// Coarse classification of every failure this crate reports.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The queried segment or process does not exist.
    NotFound,
    /// A segment could not be created, opened, resized or mapped.
    CreationFailure,
    /// The caller lacks the rights to act on the target.
    PermissionFailure,
    /// The caller passed a name or pid the platform cannot accept.
    InvalidInput,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::CreationFailure => "creation failure",
            ErrorKind::PermissionFailure => "permission failure",
            ErrorKind::InvalidInput => "invalid input",
        };
        f.write_str(s)
    }
}

/// The step of the segment lifecycle that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentOp {
    Open,
    Create,
    Resize,
    Map,
    Inspect,
    Remove,
}

impl fmt::Display for SegmentOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SegmentOp::Open => "open",
            SegmentOp::Create => "create",
            SegmentOp::Resize => "resize",
            SegmentOp::Map => "map",
            SegmentOp::Inspect => "inspect",
            SegmentOp::Remove => "remove",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum VarError {
    #[error("invalid variable name {name:?}: {reason}")]
    InvalidInput { name: String, reason: String },
    #[error("failed to {op} shared memory segment {name:?}: {source}")]
    CreationFailure {
        name: String,
        op: SegmentOp,
        #[source]
        source: io::Error,
    },
}

impl VarError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        VarError::InvalidInput {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn segment(name: &str, op: SegmentOp, source: io::Error) -> Self {
        VarError::CreationFailure {
            name: name.to_owned(),
            op,
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            VarError::InvalidInput { .. } => ErrorKind::InvalidInput,
            VarError::CreationFailure { .. } => ErrorKind::CreationFailure,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("pid {0} is out of range for this platform")]
    InvalidPid(u64),
    #[error("failed to detach from the controlling session: {0}")]
    DetachFailed(#[source] io::Error),
    #[error("failed to check the status of process {pid}: {source}")]
    StatusCheckFailed {
        pid: u64,
        #[source]
        source: io::Error,
    },
}

impl ProcessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProcessError::InvalidPid(_) => ErrorKind::InvalidInput,
            ProcessError::DetachFailed(err)
            | ProcessError::StatusCheckFailed { source: err, .. } => match err.kind() {
                io::ErrorKind::PermissionDenied => ErrorKind::PermissionFailure,
                io::ErrorKind::NotFound => ErrorKind::NotFound,
                _ => ErrorKind::CreationFailure,
            },
        }
    }
}

/// Turns a Win32 failure into an `io::Error`, keeping the system message text.
#[cfg(windows)]
pub(crate) fn win32_to_io(err: windows::core::Error) -> io::Error {
    const FACILITY_WIN32: u32 = 0x8007_0000;
    let code = err.code().0 as u32;
    if code & 0xFFFF_0000 == FACILITY_WIN32 {
        io::Error::from_raw_os_error((code & 0xFFFF) as i32)
    } else {
        io::Error::other(err)
    }
}
