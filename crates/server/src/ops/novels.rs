#![forbid(unsafe_code)]

use super::args;
use crate::service::ImportService;
use crate::{view, wire};
use ns_core::ordering::{SortOrder, display_order};
use ns_storage::NovelUpdateRequest;
use serde_json::{Value, json};

pub(crate) fn novel_list(service: &mut ImportService, args: Value) -> Value {
    let owner = match args::owner_from(&args) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let limit = args::optional_usize(&args, "limit").unwrap_or(50);
    let offset = args::optional_usize(&args, "offset").unwrap_or(0);

    let settings = match service.store().settings_get(&owner) {
        Ok(settings) => settings,
        Err(err) => return wire::store_error(&err),
    };
    match service.store().novel_list(&owner, limit, offset) {
        Ok(rows) => {
            let novels: Vec<Value> = rows
                .iter()
                .map(|row| view::novel_json(row, settings.default_sort_order))
                .collect();
            wire::ok(json!({ "novels": novels }))
        }
        Err(err) => wire::store_error(&err),
    }
}

pub(crate) fn novel_get(service: &mut ImportService, args: Value) -> Value {
    let owner = match args::owner_from(&args) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let slug = match args::novel_slug_from(&args) {
        Ok(slug) => slug,
        Err(response) => return response,
    };
    let include_chapters = args::optional_bool(&args, "include_chapters").unwrap_or(true);
    let include_content = args::optional_bool(&args, "include_content").unwrap_or(false);

    let novel = match service.store().novel_get(&owner, &slug) {
        Ok(Some(novel)) => novel,
        Ok(None) => return wire::err("NOT_FOUND", 404, "novel not found"),
        Err(err) => return wire::store_error(&err),
    };
    let settings = match service.store().settings_get(&owner) {
        Ok(settings) => settings,
        Err(err) => return wire::store_error(&err),
    };
    let order = novel.effective_sort_order(settings.default_sort_order);

    let mut payload = view::novel_json(&novel, settings.default_sort_order);
    if include_chapters {
        let rows = match service.store().chapter_list(&owner, &slug) {
            Ok(rows) => rows,
            Err(err) => return wire::store_error(&err),
        };
        let chapters: Vec<Value> = display_order(rows, order)
            .iter()
            .enumerate()
            .map(|(display_index, row)| {
                view::chapter_json(row, Some(display_index), include_content)
            })
            .collect();
        if let Some(object) = payload.as_object_mut() {
            object.insert("chapters".to_string(), json!(chapters));
        }
    }
    wire::ok(payload)
}

pub(crate) fn novel_update(service: &mut ImportService, args: Value) -> Value {
    let owner = match args::owner_from(&args) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let slug = match args::novel_slug_from(&args) {
        Ok(slug) => slug,
        Err(response) => return response,
    };

    let request = NovelUpdateRequest {
        title: args::optional_string(&args, "title"),
        translated_title: args::optional_string(&args, "translated_title"),
        author: args::optional_string(&args, "author"),
        translated_author: args::optional_string(&args, "translated_author"),
        cover_url: args::optional_string(&args, "cover_url"),
        tags: args::optional_string_list(&args, "tags"),
        translated_tags: args::optional_string_list(&args, "translated_tags"),
        synopsis: args::optional_string(&args, "synopsis"),
        translated_synopsis: args::optional_string(&args, "translated_synopsis"),
        glossary_json: args
            .get("glossary")
            .filter(|value| !value.is_null())
            .map(|value| value.to_string()),
        source_url: args::optional_string(&args, "source_url"),
    };

    let settings = match service.store().settings_get(&owner) {
        Ok(settings) => settings,
        Err(err) => return wire::store_error(&err),
    };
    match service.store_mut().novel_update(&owner, &slug, request) {
        Ok(row) => wire::ok(json!({
            "novel": view::novel_json(&row, settings.default_sort_order)
        })),
        Err(err) => wire::store_error(&err),
    }
}

pub(crate) fn novel_delete(service: &mut ImportService, args: Value) -> Value {
    let owner = match args::owner_from(&args) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let slug = match args::novel_slug_from(&args) {
        Ok(slug) => slug,
        Err(response) => return response,
    };

    match service.store_mut().novel_delete(&owner, &slug) {
        Ok(true) => wire::ok(json!({ "message": "Novel deleted" })),
        Ok(false) => wire::err("NOT_FOUND", 404, "novel not found"),
        Err(err) => wire::store_error(&err),
    }
}

/// `sort_order` is `asc`, `desc`, or `default`; `default` clears the
/// per-novel override so the owner's setting applies again.
pub(crate) fn novel_set_sort_order(service: &mut ImportService, args: Value) -> Value {
    let owner = match args::owner_from(&args) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let slug = match args::novel_slug_from(&args) {
        Ok(slug) => slug,
        Err(response) => return response,
    };
    let raw = match args::require_str(&args, "sort_order") {
        Ok(value) => value,
        Err(response) => return response,
    };

    let order = match raw {
        "default" => None,
        value => match SortOrder::parse(value) {
            Some(order) => Some(order),
            None => {
                return wire::err(
                    "INVALID_INPUT",
                    400,
                    "sort_order must be asc, desc, or default",
                );
            }
        },
    };

    match service.store_mut().novel_set_sort_order(&owner, &slug, order) {
        Ok(()) => wire::ok(json!({ "message": "Sort order updated" })),
        Err(err) => wire::store_error(&err),
    }
}
