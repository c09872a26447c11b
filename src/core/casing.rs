//! Payload key-casing transformer.
//!
//! The EmasGo API speaks snake_case on the wire; the internal model is
//! camelCase. Every request body passes through [`to_wire_case`] on the way
//! out and every response `data` field passes through [`to_internal_case`]
//! on the way in, so nothing outside the transport layer ever sees wire
//! casing.
//!
//! Both transforms are pure, deterministic, and recursive: they rewrite
//! mapping keys only, descend through objects and arrays, and terminate at
//! scalars and null. Date values travel as ISO-8601 strings, which are
//! scalars here and pass through untouched.
//!
//! # Known limitation
//!
//! The key conversion is not round-trip-safe for keys that already contain
//! the separator in camel form (`some_odd` stays `some_odd` both ways) or
//! for consecutive uppercase runs (`parseURL` becomes `parse_u_r_l`, which
//! comes back as `parseURL` only by accident of length). This mirrors the
//! API contract and is accepted, not masked. For keys made of plain
//! identifier characters the two directions are exact inverses.

use serde_json::Value;

/// Convert a camelCase key to snake_case.
///
/// Each ASCII uppercase letter becomes `_` followed by its lowercase form.
#[must_use]
pub fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Convert a snake_case key to camelCase.
///
/// Only `_` immediately followed by an ASCII lowercase letter collapses;
/// any other underscore (trailing, doubled, before a digit) is preserved.
#[must_use]
pub fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '_'
            && let Some(&next) = chars.peek()
            && next.is_ascii_lowercase()
        {
            out.push(next.to_ascii_uppercase());
            chars.next();
        } else {
            out.push(ch);
        }
    }
    out
}

/// Recursively rewrite all mapping keys in `value` to wire (snake_case) form.
#[must_use]
pub fn to_wire_case(value: Value) -> Value {
    transform_keys(value, &camel_to_snake)
}

/// Recursively rewrite all mapping keys in `value` to internal (camelCase) form.
#[must_use]
pub fn to_internal_case(value: Value) -> Value {
    transform_keys(value, &snake_to_camel)
}

fn transform_keys(value: Value, convert: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (convert(&k), transform_keys(v, convert)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|v| transform_keys(v, convert))
                .collect(),
        ),
        // Scalars and null terminate the recursion. Array order is untouched.
        other => other,
    }
}
