// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tag parsing for resource fragments
//!
//! Tags are `key=value` pairs joined by `&`, attached to a resource through
//! its URI fragment (`tcp://db:5432#timeout=5s&retries=3`). Parsing is
//! tolerant: segments without a key are dropped instead of failing the
//! whole resource.

use std::collections::BTreeMap;

/// Parsed tag map, ordered by key
pub type Tags = BTreeMap<String, String>;

/// Parse a `key=value&key` fragment into a tag map
///
/// | segment     | result          |
/// |-------------|-----------------|
/// | (empty)     | no entry        |
/// | `key`       | `key -> ""`     |
/// | `key=`      | `key -> ""`     |
/// | `key=value` | `key -> value`  |
/// | `=value`    | skipped         |
pub fn parse_tags(input: &str) -> Tags {
    let mut tags = Tags::new();
    for segment in input.split('&') {
        let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
        if key.is_empty() {
            continue;
        }
        tags.insert(key.to_string(), value.to_string());
    }
    tags
}

/// Render a tag map back into fragment form
pub fn format_tags(tags: &Tags) -> String {
    tags.iter()
        .map(|(k, v)| {
            if v.is_empty() {
                k.clone()
            } else {
                format!("{}={}", k, v)
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
#[path = "tags_tests.rs"]
mod tests;
