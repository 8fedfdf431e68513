//! # Struct Tags
//!
//! Reads Go struct tags (`gql:"name,omit" json:"name,omitempty"`) with the same
//! `key:"value"` convention `reflect.StructTag` uses.

use regex::Regex;
use std::sync::OnceLock;

/// Returns the unquoted value stored under `key`, if the tag has one.
pub fn lookup(tag: &str, key: &str) -> Option<String> {
    static PAIR_RE: OnceLock<Regex> = OnceLock::new();
    let pair_re = PAIR_RE.get_or_init(|| {
        Regex::new(r#"([^\s:"]+):"((?:[^"\\]|\\.)*)""#).expect("Invalid regex")
    });

    pair_re
        .captures_iter(tag)
        .find(|caps| caps.get(1).is_some_and(|k| k.as_str() == key))
        .and_then(|caps| caps.get(2))
        .map(|value| unescape(value.as_str()))
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// The first comma-separated segment of the `json` tag, used as a fallback
/// field name. `Some("-")` means the field is never serialized.
pub fn json_name(tag: &str) -> Option<String> {
    let value = lookup(tag, "json")?;
    let first = value.split(',').next().unwrap_or_default().trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}
