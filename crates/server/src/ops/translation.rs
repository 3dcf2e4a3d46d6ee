#![forbid(unsafe_code)]

use super::args;
use crate::service::ImportService;
use crate::{view, wire};
use ns_storage::TranslationCompleteRequest;
use serde_json::{Value, json};

pub(crate) fn translation_claim(service: &mut ImportService, args: Value) -> Value {
    let owner = match args::owner_from(&args) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    match service.store_mut().translation_claim(&owner) {
        Ok(Some(job)) => wire::ok(json!({ "job": view::job_json(&job) })),
        Ok(None) => wire::ok(json!({ "job": Value::Null })),
        Err(err) => wire::store_error(&err),
    }
}

pub(crate) fn translation_complete(service: &mut ImportService, args: Value) -> Value {
    let owner = match args::owner_from(&args) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let seq = match args::require_i64(&args, "seq") {
        Ok(value) => value,
        Err(response) => return response,
    };

    let request = TranslationCompleteRequest {
        translated_title: args::optional_string(&args, "translated_title"),
        translated_content: args::optional_string(&args, "translated_content"),
        translation_model: args::optional_string(&args, "translation_model"),
    };

    match service.store_mut().translation_complete(&owner, seq, request) {
        Ok(job) => wire::ok(json!({ "job": view::job_json(&job) })),
        Err(err) => wire::store_error(&err),
    }
}

pub(crate) fn translation_fail(service: &mut ImportService, args: Value) -> Value {
    let owner = match args::owner_from(&args) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let seq = match args::require_i64(&args, "seq") {
        Ok(value) => value,
        Err(response) => return response,
    };
    match service.store_mut().translation_fail(&owner, seq) {
        Ok(job) => wire::ok(json!({ "job": view::job_json(&job) })),
        Err(err) => wire::store_error(&err),
    }
}

pub(crate) fn translation_list(service: &mut ImportService, args: Value) -> Value {
    let owner = match args::owner_from(&args) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let status = args::optional_str(&args, "status");
    let limit = args::optional_usize(&args, "limit").unwrap_or(50);

    match service.store().translation_list(&owner, status, limit) {
        Ok(jobs) => {
            let jobs: Vec<Value> = jobs.iter().map(view::job_json).collect();
            wire::ok(json!({ "jobs": jobs }))
        }
        Err(err) => wire::store_error(&err),
    }
}
