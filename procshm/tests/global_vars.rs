// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use procshm::{name_max_len, ErrorKind, GlobalVarStore};

fn unique(tag: &str) -> String {
    format!("procshm-it-{tag}-{}", std::process::id())
}

#[test]
#[cfg_attr(miri, ignore)]
fn set_get_unset() {
    let name = unique("basic");
    let mut store = GlobalVarStore::new();

    store.set(&name, 42).unwrap();
    assert!(store.exists(&name).unwrap());
    assert_eq!(store.get(&name).unwrap(), Some(42));

    store.unset(&name).unwrap();
    assert!(!store.exists(&name).unwrap());
    assert_eq!(store.get(&name).unwrap(), None);
}

#[test]
#[cfg_attr(miri, ignore)]
fn reading_never_creates() {
    let name = unique("absent");
    let mut store = GlobalVarStore::new();

    assert!(!store.exists(&name).unwrap());
    assert_eq!(store.get(&name).unwrap(), None);
    assert!(!store.exists(&name).unwrap());
    assert_eq!(store.cached_len(), 0);
}

#[test]
#[cfg_attr(miri, ignore)]
fn unset_of_unknown_name_succeeds() {
    let mut store = GlobalVarStore::new();
    store.unset(&unique("never-set")).unwrap();
    store.unset(&unique("never-set")).unwrap();
}

#[test]
#[cfg_attr(miri, ignore)]
fn repeated_and_overwriting_sets() {
    let name = unique("overwrite");
    let mut store = GlobalVarStore::new();

    store.set(&name, 7).unwrap();
    store.set(&name, 7).unwrap();
    assert_eq!(store.get(&name).unwrap(), Some(7));

    for value in [i32::MIN, -1, 0, i32::MAX] {
        store.set(&name, value).unwrap();
        assert_eq!(store.get(&name).unwrap(), Some(value));
    }
    assert_eq!(store.cached_len(), 1);

    store.unset(&name).unwrap();
}

#[test]
#[cfg_attr(miri, ignore)]
fn values_are_shared_between_stores() {
    let name = unique("shared");
    let mut writer = GlobalVarStore::new();
    let mut reader = GlobalVarStore::new();

    writer.set(&name, 5).unwrap();
    assert_eq!(reader.get(&name).unwrap(), Some(5));

    // the reader's cached mapping observes later writes
    writer.set(&name, 6).unwrap();
    assert_eq!(reader.get(&name).unwrap(), Some(6));

    // and a read-only handle is upgraded on write
    reader.set(&name, 8).unwrap();
    assert_eq!(writer.get(&name).unwrap(), Some(8));

    drop(reader);
    writer.unset(&name).unwrap();
}

// Windows keeps a mapping alive while any store still holds it.
#[test]
#[cfg(unix)]
#[cfg_attr(miri, ignore)]
fn removal_by_another_store_is_observed() {
    let name = unique("foreign-unset");
    let mut owner = GlobalVarStore::new();
    let mut other = GlobalVarStore::new();

    owner.set(&name, 1).unwrap();
    other.unset(&name).unwrap();
    assert!(!owner.exists(&name).unwrap());
    assert_eq!(owner.get(&name).unwrap(), None);
    assert!(!owner.contains_cached(&name));

    // a write after the removal creates a segment everybody sees
    owner.set(&name, 2).unwrap();
    assert!(owner.exists(&name).unwrap());
    assert_eq!(GlobalVarStore::new().get(&name).unwrap(), Some(2));

    owner.unset(&name).unwrap();
}

#[test]
#[cfg_attr(miri, ignore)]
fn name_length_limit() {
    let max = name_max_len();
    let mut name = unique("max");
    while name.len() < max {
        name.push('x');
    }
    let mut store = GlobalVarStore::new();

    store.set(&name, 1).unwrap();
    assert_eq!(store.get(&name).unwrap(), Some(1));
    store.unset(&name).unwrap();

    name.push('x');
    let err = store.set(&name, 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    let err = store.get(&name).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn empty_name_is_rejected() {
    let mut store = GlobalVarStore::new();
    assert_eq!(store.exists("").unwrap_err().kind(), ErrorKind::InvalidInput);
    assert_eq!(store.set("", 1).unwrap_err().kind(), ErrorKind::InvalidInput);
    assert_eq!(store.unset("").unwrap_err().kind(), ErrorKind::InvalidInput);
}
