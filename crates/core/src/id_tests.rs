// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::borrow::Borrow;
use std::collections::HashMap;

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId;
}

#[test]
fn define_id_new_and_as_str() {
    let id = TestId::new("abc");
    assert_eq!(id.as_str(), "abc");
    assert_eq!(id.to_string(), "abc");
}

#[test]
fn define_id_partial_eq_str() {
    let id = TestId::new("test");
    assert_eq!(id, *"test");
    assert_eq!(id, "test");
}

#[test]
fn define_id_hash_map_lookup() {
    let mut map = HashMap::new();
    map.insert(TestId::new("k"), 42);
    assert_eq!(map.get("k"), Some(&42));
    let id = TestId::new("key");
    let borrowed: &str = id.borrow();
    assert_eq!(borrowed, "key");
}

#[test]
fn define_id_serializes_as_bare_string() {
    let id = TestId::new("agent-7");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"agent-7\"");
    let back: TestId = serde_json::from_str("\"agent-7\"").unwrap();
    assert_eq!(back, id);
}

#[yare::parameterized(
    shorter   = { "abc", 8, "abc" },
    exact     = { "abcdefgh", 8, "abcdefgh" },
    truncated = { "564e9408-fb78-4856", 8, "564e9408" },
    multibyte = { "ééééé", 2, "éé" },
)]
fn short_truncates_on_char_boundary(input: &str, n: usize, expected: &str) {
    assert_eq!(input.short(n), expected);
    assert_eq!(TestId::new(input).short(n), expected);
}

#[test]
fn random_ids_are_unique() {
    assert_ne!(random_id(), random_id());
}
