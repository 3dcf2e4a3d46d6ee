#![forbid(unsafe_code)]

use crate::wire;
use ns_core::ids::{NovelSlug, OwnerId};
use serde_json::Value;

pub(crate) fn require_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, Value> {
    match args.get(key).and_then(Value::as_str) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(wire::err(
            "INVALID_INPUT",
            400,
            format!("{key} is required"),
        )),
    }
}

pub(crate) fn optional_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

pub(crate) fn optional_string(args: &Value, key: &str) -> Option<String> {
    optional_str(args, key).map(str::to_string)
}

pub(crate) fn optional_bool(args: &Value, key: &str) -> Option<bool> {
    args.get(key).and_then(Value::as_bool)
}

pub(crate) fn optional_i64(args: &Value, key: &str) -> Option<i64> {
    args.get(key).and_then(Value::as_i64)
}

pub(crate) fn optional_usize(args: &Value, key: &str) -> Option<usize> {
    args.get(key)
        .and_then(Value::as_u64)
        .and_then(|value| usize::try_from(value).ok())
}

pub(crate) fn optional_u32(args: &Value, key: &str) -> Option<u32> {
    args.get(key)
        .and_then(Value::as_u64)
        .and_then(|value| u32::try_from(value).ok())
}

pub(crate) fn require_usize(args: &Value, key: &str) -> Result<usize, Value> {
    optional_usize(args, key).ok_or_else(|| {
        wire::err(
            "INVALID_INPUT",
            400,
            format!("{key} is required and must be a non-negative integer"),
        )
    })
}

pub(crate) fn require_i64(args: &Value, key: &str) -> Result<i64, Value> {
    optional_i64(args, key).ok_or_else(|| {
        wire::err(
            "INVALID_INPUT",
            400,
            format!("{key} is required and must be an integer"),
        )
    })
}

pub(crate) fn optional_string_list(args: &Value, key: &str) -> Option<Vec<String>> {
    let list = args.get(key)?.as_array()?;
    Some(
        list.iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

pub(crate) fn owner_from(args: &Value) -> Result<OwnerId, Value> {
    let raw = require_str(args, "owner")?;
    OwnerId::try_new(raw).map_err(|_| wire::err("INVALID_INPUT", 400, "invalid owner"))
}

pub(crate) fn novel_slug_from(args: &Value) -> Result<NovelSlug, Value> {
    let raw = require_str(args, "novel_id")?;
    NovelSlug::try_new(raw).map_err(|_| wire::err("INVALID_INPUT", 400, "invalid novel_id"))
}
