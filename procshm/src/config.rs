// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;

const ENV_LOG_METHOD: &str = "PROCSHM_LOG_METHOD";
const LOG_METHOD_DISABLED: &str = "disabled";
const LOG_METHOD_STDOUT: &str = "stdout";
const LOG_METHOD_STDERR: &str = "stderr";

const ENV_LOG_LEVEL: &str = "PROCSHM_LOG_LEVEL";
const DEFAULT_LOG_LEVEL: &str = "info";

const ENV_SEGMENT_MODE: &str = "PROCSHM_SEGMENT_MODE";
/// Owner read/write, the mode segments get unless configured otherwise.
pub const DEFAULT_SEGMENT_MODE: u32 = 0o600;

const HELP: &str = "help";

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum LogMethod {
    Stdout,
    Stderr,
    File(PathBuf),
    #[default]
    Disabled,
}

impl std::fmt::Display for LogMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogMethod::Disabled => write!(f, "{LOG_METHOD_DISABLED}"),
            LogMethod::Stdout => write!(f, "{LOG_METHOD_STDOUT}"),
            LogMethod::Stderr => write!(f, "{LOG_METHOD_STDERR}"),
            LogMethod::File(path) => write!(f, "file://{}", path.to_string_lossy()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub log_method: LogMethod,
    pub log_level: String,
    /// Permission bits for segments created by this process. Only used on Unix.
    pub segment_mode: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_method: LogMethod::default(),
            log_level: DEFAULT_LOG_LEVEL.to_owned(),
            segment_mode: DEFAULT_SEGMENT_MODE,
        }
    }
}

impl Config {
    pub fn get() -> Self {
        FromEnv::config()
    }

    /// The variables which make a child process pick up the same configuration.
    pub fn to_env(&self) -> HashMap<&'static str, OsString> {
        HashMap::from([
            (ENV_LOG_METHOD, self.log_method.to_string().into()),
            (ENV_LOG_LEVEL, self.log_level.clone().into()),
            (ENV_SEGMENT_MODE, format!("{:o}", self.segment_mode).into()),
        ])
    }
}

pub struct FromEnv {}

impl FromEnv {
    pub fn log_method() -> LogMethod {
        Self::parse_log_method(&std::env::var(ENV_LOG_METHOD).unwrap_or_default())
    }

    fn parse_log_method(method: &str) -> LogMethod {
        match method {
            LOG_METHOD_DISABLED => LogMethod::Disabled,
            LOG_METHOD_STDOUT => LogMethod::Stdout,
            LOG_METHOD_STDERR => LogMethod::Stderr,
            HELP => {
                println!("help: {ENV_LOG_METHOD}: {LOG_METHOD_DISABLED}|{LOG_METHOD_STDOUT}|{LOG_METHOD_STDERR}|file:///path/to/file");
                LogMethod::default()
            }
            // a plain, unencoded path prefixed with file://
            method => match method.strip_prefix("file://") {
                Some(path) if !path.is_empty() => LogMethod::File(PathBuf::from(path)),
                _ => LogMethod::default(),
            },
        }
    }

    pub fn log_level() -> String {
        match std::env::var(ENV_LOG_LEVEL) {
            Ok(level) if !level.is_empty() => level,
            _ => DEFAULT_LOG_LEVEL.to_owned(),
        }
    }

    pub fn segment_mode() -> u32 {
        Self::parse_segment_mode(&std::env::var(ENV_SEGMENT_MODE).unwrap_or_default())
    }

    fn parse_segment_mode(mode: &str) -> u32 {
        if mode == HELP {
            println!("help: {ENV_SEGMENT_MODE}: octal permission bits, e.g. 600 or 0666");
            return DEFAULT_SEGMENT_MODE;
        }
        u32::from_str_radix(mode.trim_start_matches("0o"), 8)
            .ok()
            .filter(|mode| *mode <= 0o777)
            .unwrap_or(DEFAULT_SEGMENT_MODE)
    }

    pub fn config() -> Config {
        Config {
            log_method: Self::log_method(),
            log_level: Self::log_level(),
            segment_mode: Self::segment_mode(),
        }
    }
}
