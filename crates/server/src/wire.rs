#![forbid(unsafe_code)]

use crate::service::ServiceError;
use ns_storage::StoreError;
use serde_json::{Value, json};

/// Wraps a payload object into a success envelope.
pub fn ok(payload: Value) -> Value {
    let mut object = match payload {
        Value::Object(map) => map,
        other => {
            let mut map = serde_json::Map::new();
            map.insert("result".to_string(), other);
            map
        }
    };
    object.insert("success".to_string(), json!(true));
    Value::Object(object)
}

/// Structured failure. `http_status` lets the out-of-process web layer map
/// responses without inspecting codes: 429 carries retry-after semantics,
/// 409 is transient (retry as-is), 4xx otherwise means the request itself
/// must change.
pub fn err(code: &str, http_status: u16, message: impl Into<String>) -> Value {
    json!({
        "success": false,
        "error": message.into(),
        "error_code": code,
        "http_status": http_status,
    })
}

pub fn service_error(error: &ServiceError) -> Value {
    match error {
        ServiceError::RateLimited { max_concurrent } => err(
            "RATE_LIMITED",
            429,
            format!(
                "Too many concurrent imports. Maximum allowed: {max_concurrent}. \
                 Please wait for current imports to complete."
            ),
        ),
        ServiceError::InvalidInput(message) => err("INVALID_INPUT", 400, message.clone()),
        ServiceError::Store(store) => store_error(store),
    }
}

pub fn store_error(error: &StoreError) -> Value {
    match error {
        StoreError::NovelNotFound => err("NOT_FOUND", 404, "novel not found"),
        StoreError::ChapterNotFound => err("NOT_FOUND", 404, "chapter not found"),
        StoreError::JobNotFound => err("NOT_FOUND", 404, "translation job not found"),
        StoreError::DuplicateSlug => err("DUPLICATE_SLUG", 409, "novel slug already exists"),
        StoreError::ConcurrencyAborted => err(
            "CONCURRENCY_ABORTED",
            409,
            "storage transaction aborted, retry the request",
        ),
        StoreError::InvalidInput(message) => err("INVALID_INPUT", 400, *message),
        StoreError::Io(_) | StoreError::Sql(_) => {
            tracing::error!(%error, "storage failure");
            err("INTERNAL", 500, "internal storage error")
        }
    }
}
