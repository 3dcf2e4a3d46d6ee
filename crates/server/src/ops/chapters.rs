#![forbid(unsafe_code)]

use super::args;
use crate::service::ImportService;
use crate::{view, wire};
use ns_core::ids::{NovelSlug, OwnerId};
use ns_core::ordering::display_to_storage_index;
use ns_storage::{ChapterRow, ChapterUpdateRequest};
use serde_json::{Value, json};

/// Resolves a display index to the chapter it shows. All index-addressed
/// operations go through here; raw storage positions would silently target
/// the wrong chapter whenever the novel displays descending.
fn resolve_display_index(
    service: &ImportService,
    owner: &OwnerId,
    slug: &NovelSlug,
    display_index: usize,
) -> Result<ChapterRow, Value> {
    let novel = match service.store().novel_get(owner, slug) {
        Ok(Some(novel)) => novel,
        Ok(None) => return Err(wire::err("NOT_FOUND", 404, "novel not found")),
        Err(err) => return Err(wire::store_error(&err)),
    };
    let settings = service
        .store()
        .settings_get(owner)
        .map_err(|err| wire::store_error(&err))?;
    let order = novel.effective_sort_order(settings.default_sort_order);

    let mut rows = service
        .store()
        .chapter_list(owner, slug)
        .map_err(|err| wire::store_error(&err))?;
    let Some(storage_index) = display_to_storage_index(rows.len(), display_index, order) else {
        return Err(wire::err("NOT_FOUND", 404, "chapter index out of range"));
    };
    Ok(rows.swap_remove(storage_index))
}

pub(crate) fn chapter_get(service: &mut ImportService, args: Value) -> Value {
    let owner = match args::owner_from(&args) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let slug = match args::novel_slug_from(&args) {
        Ok(slug) => slug,
        Err(response) => return response,
    };
    let display_index = match args::require_usize(&args, "chapter_index") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let include_content = args::optional_bool(&args, "include_content").unwrap_or(true);

    match resolve_display_index(service, &owner, &slug, display_index) {
        Ok(row) => wire::ok(json!({
            "chapter": view::chapter_json(&row, Some(display_index), include_content)
        })),
        Err(response) => response,
    }
}

pub(crate) fn chapter_update(service: &mut ImportService, args: Value) -> Value {
    let owner = match args::owner_from(&args) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let slug = match args::novel_slug_from(&args) {
        Ok(slug) => slug,
        Err(response) => return response,
    };
    let display_index = match args::require_usize(&args, "chapter_index") {
        Ok(value) => value,
        Err(response) => return response,
    };

    let row = match resolve_display_index(service, &owner, &slug, display_index) {
        Ok(row) => row,
        Err(response) => return response,
    };

    let request = ChapterUpdateRequest {
        title: args::optional_string(&args, "title"),
        translated_title: args::optional_string(&args, "translated_title"),
        chapter_number: args::optional_string(&args, "chapter_number"),
        content: args::optional_string(&args, "content"),
        translated_content: args::optional_string(&args, "translated_content"),
        translation_model: args::optional_string(&args, "translation_model"),
        translation_status: args::optional_string(&args, "translation_status"),
        images_json: args
            .get("images")
            .filter(|value| !value.is_null())
            .map(|value| value.to_string()),
    };

    match service.store_mut().chapter_update(&owner, row.id, request) {
        Ok(updated) => wire::ok(json!({
            "chapter": view::chapter_json(&updated, Some(display_index), true)
        })),
        Err(err) => wire::store_error(&err),
    }
}

pub(crate) fn chapter_delete(service: &mut ImportService, args: Value) -> Value {
    let owner = match args::owner_from(&args) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let slug = match args::novel_slug_from(&args) {
        Ok(slug) => slug,
        Err(response) => return response,
    };
    let display_index = match args::require_usize(&args, "chapter_index") {
        Ok(value) => value,
        Err(response) => return response,
    };

    let row = match resolve_display_index(service, &owner, &slug, display_index) {
        Ok(row) => row,
        Err(response) => return response,
    };

    match service.store_mut().chapter_delete(&owner, &slug, row.id) {
        Ok(true) => wire::ok(json!({ "message": "Chapter deleted" })),
        Ok(false) => wire::err("NOT_FOUND", 404, "chapter not found"),
        Err(err) => wire::store_error(&err),
    }
}
