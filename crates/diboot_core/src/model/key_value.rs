//! Key-value projection of dictionary items.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One `(k, v)` pair derived from a dictionary item row.
///
/// `k` is the human-readable item name and `v` the stored item value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub k: String,
    pub v: String,
}

impl KeyValue {
    pub fn new(k: impl Into<String>, v: impl Into<String>) -> Self {
        Self {
            k: k.into(),
            v: v.into(),
        }
    }
}

/// Converts a key-value list into a lookup map keyed by `k`.
///
/// Later duplicates win, matching insertion order of the source list.
pub fn key_value_list_to_map(items: &[KeyValue]) -> BTreeMap<String, String> {
    items
        .iter()
        .map(|item| (item.k.clone(), item.v.clone()))
        .collect()
}
