#![forbid(unsafe_code)]

use super::args;
use crate::service::ImportService;
use crate::{view, wire};
use ns_core::ordering::SortOrder;
use ns_storage::SettingsUpdateRequest;
use serde_json::{Value, json};

pub(crate) fn settings_get(service: &mut ImportService, args: Value) -> Value {
    let owner = match args::owner_from(&args) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    match service.store().settings_get(&owner) {
        Ok(settings) => wire::ok(json!({ "settings": view::settings_json(&settings) })),
        Err(err) => wire::store_error(&err),
    }
}

pub(crate) fn settings_update(service: &mut ImportService, args: Value) -> Value {
    let owner = match args::owner_from(&args) {
        Ok(owner) => owner,
        Err(response) => return response,
    };

    let default_sort_order = match args::optional_str(&args, "default_sort_order") {
        None => None,
        Some(raw) => match SortOrder::parse(raw) {
            Some(order) => Some(order),
            None => {
                return wire::err(
                    "INVALID_INPUT",
                    400,
                    "default_sort_order must be asc or desc",
                );
            }
        },
    };

    let request = SettingsUpdateRequest {
        default_sort_order,
        max_concurrent_imports: args::optional_u32(&args, "max_concurrent_imports"),
    };

    match service.store_mut().settings_update(&owner, request) {
        Ok(settings) => wire::ok(json!({ "settings": view::settings_json(&settings) })),
        Err(err) => wire::store_error(&err),
    }
}
