//! Helpers for resolving typed options from a `serde_json::Value` object.
//!
//! Options structs call these once in their `from_json` constructors. Scalar
//! helpers never fail: a missing or mistyped key yields the default. Enum
//! names are stricter, since a misspelled mode silently falling back would
//! produce a different mask: [`param_enum`] rejects unknown names with
//! `MaskError::InvalidConfiguration`.

use std::str::FromStr;

use serde_json::Value;

use crate::error::MaskError;

/// Extracts an `f64` from `params[name]`, returning `default` if missing or wrong type.
///
/// Accepts both JSON floats and integers.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a `usize` from `params[name]`, returning `default` if missing or
/// not a non-negative integer.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

/// Extracts a `u64` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_u64(params: &Value, name: &str, default: u64) -> u64 {
    params.get(name).and_then(Value::as_u64).unwrap_or(default)
}

/// Extracts an `i64` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_i64(params: &Value, name: &str, default: i64) -> i64 {
    params.get(name).and_then(Value::as_i64).unwrap_or(default)
}

/// Extracts a `bool` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

/// Resolves an enum option by its snake_case name.
///
/// A missing key yields `default`. A present key that is not a string, or a
/// string `T` does not recognize, is `MaskError::InvalidConfiguration` naming
/// the field.
pub fn param_enum<T>(params: &Value, name: &str, default: T) -> Result<T, MaskError>
where
    T: FromStr<Err = MaskError>,
{
    match params.get(name) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::String(s)) => s.parse::<T>().map_err(|_| MaskError::invalid(name, s)),
        Some(other) => Err(MaskError::invalid(name, other)),
    }
}
