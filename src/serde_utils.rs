//! Lenient deserializers for chore records.
//!
//! Stored and imported chores come from several generations of the app, so a
//! field that is "a number" may arrive as `3`, `3.0` or `"3"`, and a member
//! list may be an array or a comma-separated string. These helpers accept all
//! of those shapes and map anything unusable to `None` instead of failing the
//! whole record.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

use crate::dates::parse_date_key;

/// Deserialize an optional date-key, treating unparseable values as absent.
pub fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(date_from_value))
}

/// Deserialize an optional positive integer (`1`, `1.0`, `"1"`).
pub fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(integer_from_value)
        .and_then(|n| u32::try_from(n).ok()))
}

/// Deserialize an optional signed cursor; non-finite or non-numeric values
/// are treated as absent.
pub fn lenient_index<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(integer_from_value))
}

/// Deserialize a member list from an array or a comma-separated string.
pub fn lenient_names<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(names_from_value))
}

/// Deserialize a loosely typed boolean (`true`, `"true"`, `1`).
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// Deserialize an optional free-text field, accepting numbers as text.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Deserialize a count that must be at least 1 (`interval`, `cycleLength`,
/// `everyDays`). Missing, zero or unusable values become 1.
pub fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let count = value.as_ref().and_then(integer_from_value);
    match count.and_then(|n| u32::try_from(n).ok()).filter(|n| *n >= 1) {
        Some(n) => Ok(n),
        None => {
            if let Some(value) = value.filter(|v| !v.is_null()) {
                tracing::warn!(value = %value, "ignoring invalid count, using 1");
            }
            Ok(1)
        }
    }
}

/// Deserialize a member list that defaults to empty.
pub fn lenient_name_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_names(deserializer)?.unwrap_or_default())
}

/// Deserialize a loosely typed boolean that defaults to `false`.
pub fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_bool(deserializer)?.unwrap_or(false))
}

/// Deserialize an optional nested object. A value of the wrong shape is
/// treated as absent instead of failing the enclosing record.
pub fn lenient_block<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(block_from_value))
}

/// [`lenient_block`] for fields that fall back to their `Default`.
pub fn lenient_block_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient_block(deserializer)?.unwrap_or_default())
}

/// Deserialize an enum through its `FromStr`, using `fallback` for unknown
/// or non-string values.
pub fn lenient_token<'de, D, T>(deserializer: D, fallback: T) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = String>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => fallback,
        Some(Value::String(s)) => s.parse().unwrap_or_else(|e| {
            tracing::warn!("{}, using default", e);
            fallback
        }),
        Some(other) => {
            tracing::warn!(value = %other, "ignoring non-string enum value");
            fallback
        }
    })
}

fn block_from_value<T: DeserializeOwned>(value: Value) -> Option<T> {
    match value {
        Value::Null => None,
        Value::Object(_) => match serde_json::from_value(value) {
            Ok(block) => Some(block),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed nested block");
                None
            }
        },
        other => {
            tracing::warn!(value = %other, "ignoring non-object nested block");
            None
        }
    }
}

fn date_from_value(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => {
            let parsed = parse_date_key(s);
            if parsed.is_none() && !s.trim().is_empty() {
                tracing::warn!(value = %s, "ignoring unparseable date-key");
            }
            parsed
        }
        Value::Null => None,
        other => {
            tracing::warn!(value = %other, "ignoring non-string date value");
            None
        }
    }
}

fn integer_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.floor() as i64)),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.parse::<i64>().ok().or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.floor() as i64)
            })
        }
        _ => None,
    }
}

fn names_from_value(value: &Value) -> Option<Vec<String>> {
    let names: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        _ => return None,
    };
    Some(names)
}
