// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0
// Keep this the only test of this binary: a global subscriber can be installed once per process.

use procshm::config::{Config, LogMethod};
use procshm::log::enable_logging;
use procshm::GlobalVarStore;

#[test]
#[cfg_attr(miri, ignore)]
fn events_land_in_the_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("procshm.log");
    let config = Config {
        log_method: LogMethod::File(path.clone()),
        log_level: "debug".to_owned(),
        ..Config::default()
    };
    enable_logging(&config).unwrap();

    tracing::info!("logging to a file works");
    let name = format!("procshm-log-{}", std::process::id());
    let mut store = GlobalVarStore::new();
    store.set(&name, 1).unwrap();
    store.unset(&name).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("logging to a file works"), "{contents}");
    assert!(
        contents.contains(&format!("Opened shared variable {name} for writing")),
        "{contents}"
    );
    // no colors in files
    assert!(!contents.contains('\u{1b}'));

    assert!(enable_logging(&config).is_err());
}
