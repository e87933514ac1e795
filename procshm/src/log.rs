// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::config::{Config, LogMethod};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_log::LogTracer;
use tracing_subscriber::EnvFilter;

fn create_logfile(path: &Path) -> anyhow::Result<std::fs::File> {
    let log_file = std::fs::File::options()
        .create(true)
        .truncate(false)
        .append(true)
        .open(path)?;
    Ok(log_file)
}

/// Installs the global tracing subscriber described by `config`, and routes
/// `log` records into it. Does nothing when logging is disabled.
///
/// Fails if a global subscriber was already installed.
pub fn enable_logging(config: &Config) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.log_level)?;
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    match &config.log_method {
        LogMethod::Stdout => subscriber.with_writer(io::stdout).try_init(),
        LogMethod::Stderr => subscriber.with_writer(io::stderr).try_init(),
        LogMethod::File(path) => subscriber
            .with_ansi(false)
            .with_writer(Mutex::new(create_logfile(path)?))
            .try_init(),
        LogMethod::Disabled => return Ok(()),
    }
    .map_err(|e| anyhow::anyhow!(e))?;

    LogTracer::init()?;

    Ok(())
}
