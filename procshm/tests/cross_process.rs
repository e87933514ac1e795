// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0
// Segments outliving their creator is POSIX behavior; Windows mappings die with the last handle.

#![cfg(unix)]

use procshm::GlobalVarStore;
use std::process::{Command, Output};

fn procshm(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_procshm"))
        .args(args)
        .env_remove("PROCSHM_LOG_METHOD")
        .output()
        .unwrap()
}

fn stdout_of(args: &[&str]) -> String {
    let output = procshm(args);
    assert!(
        output.status.success(),
        "procshm {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap().trim().to_owned()
}

#[test]
#[cfg_attr(miri, ignore)]
fn child_reads_what_parent_wrote() {
    let name = format!("procshm-xp-read-{}", std::process::id());
    let mut store = GlobalVarStore::new();

    assert_eq!(stdout_of(&["get", &name]), "NA");
    assert_eq!(stdout_of(&["exists", &name]), "false");

    store.set(&name, 42).unwrap();
    assert_eq!(stdout_of(&["exists", &name]), "true");
    assert_eq!(stdout_of(&["get", &name]), "42");

    store.unset(&name).unwrap();
    assert_eq!(stdout_of(&["get", &name]), "NA");
}

#[test]
#[cfg_attr(miri, ignore)]
fn parent_reads_what_child_wrote() {
    let name = format!("procshm-xp-write-{}", std::process::id());
    let mut store = GlobalVarStore::new();

    stdout_of(&["set", &name, "-7"]);
    // the segment outlives the child that created it
    assert_eq!(store.get(&name).unwrap(), Some(-7));

    // our cached mapping sees the next write as well
    stdout_of(&["set", &name, "1000"]);
    assert_eq!(store.get(&name).unwrap(), Some(1000));

    stdout_of(&["unset", &name]);
    assert!(!store.exists(&name).unwrap());
    assert_eq!(store.get(&name).unwrap(), None);
}

#[test]
#[cfg_attr(miri, ignore)]
fn writes_after_a_child_unset_are_visible() {
    let name = format!("procshm-xp-rewrite-{}", std::process::id());
    let mut store = GlobalVarStore::new();

    store.set(&name, 1).unwrap();
    stdout_of(&["unset", &name]);
    store.set(&name, 2).unwrap();

    assert_eq!(stdout_of(&["exists", &name]), "true");
    assert_eq!(stdout_of(&["get", &name]), "2");
    store.unset(&name).unwrap();
}

#[test]
#[cfg_attr(miri, ignore)]
fn invalid_input_fails_the_command() {
    let output = procshm(&["set", "a/b", "1"]);
    assert!(!output.status.success());
    assert!(!output.stderr.is_empty());

    let too_long = "x".repeat(procshm::name_max_len() + 1);
    assert!(!procshm(&["get", &too_long]).status.success());
}

#[test]
#[cfg_attr(miri, ignore)]
fn process_queries() {
    let own = std::process::id().to_string();
    assert_eq!(stdout_of(&["alive", &own]), "true");
    assert_eq!(
        stdout_of(&["name-max-len"]),
        procshm::name_max_len().to_string()
    );
    assert!(!procshm(&["alive", "0"]).status.success());
}
