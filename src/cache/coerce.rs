//! Conversions from stored values to requested scalar types.
//!
//! Two paths exist. A value that comes back as a string (anything read from
//! redis, or a string stored in memory) is parsed strictly, and a parse
//! failure yields the caller's default. Native values fall back to the
//! best-effort `to_*` conversions below, which never fail.

use crate::cache::Value;

/// Best-effort boolean view.
pub fn to_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::String(s) => parse_bool(s).unwrap_or(false),
        Value::Bytes(b) => parse_bool(&String::from_utf8_lossy(b)).unwrap_or(false),
    }
}

/// Best-effort 64-bit integer view. Floats truncate toward zero.
pub fn to_i64(value: &Value) -> i64 {
    match value {
        Value::Bool(b) => i64::from(*b),
        Value::Int(i) => *i,
        Value::Float(f) => *f as i64,
        Value::String(s) => loose_int(s),
        Value::Bytes(b) => loose_int(&String::from_utf8_lossy(b)),
    }
}

/// Best-effort 32-bit integer view; values outside `i32` become 0.
pub fn to_i32(value: &Value) -> i32 {
    i32::try_from(to_i64(value)).unwrap_or_default()
}

pub fn to_string(value: &Value) -> String {
    value.to_string()
}

/// Strict boolean parse: `1`/`0`/`true`/`false`, case-insensitive.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" => Some(true),
        "0" => Some(false),
        _ if s.eq_ignore_ascii_case("true") => Some(true),
        _ if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

pub fn parse_i32(s: &str) -> Option<i32> {
    s.parse().ok()
}

pub fn parse_i64(s: &str) -> Option<i64> {
    s.parse().ok()
}

/// Apply the two-path policy to a lookup result.
pub fn coerce_or<T>(
    value: Option<Value>,
    default: T,
    strict: impl FnOnce(&str) -> Option<T>,
    loose: impl FnOnce(&Value) -> T,
) -> T {
    match value {
        None => default,
        Some(Value::String(s)) => strict(&s).unwrap_or(default),
        Some(other) => loose(&other),
    }
}

fn loose_int(s: &str) -> i64 {
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        .unwrap_or_default()
}
