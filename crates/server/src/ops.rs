#![forbid(unsafe_code)]

mod args;
mod chapters;
mod import;
mod novels;
mod settings;
mod translation;

use crate::service::ImportService;
use crate::wire;
use serde_json::Value;

/// Every operation the dispatch understands, in one place so the dispatch
/// and the advertised surface cannot drift apart.
pub fn op_names() -> &'static [&'static str] {
    &[
        "chapter_import",
        "chapter_import_batch",
        "chapter_get",
        "chapter_update",
        "chapter_delete",
        "novel_list",
        "novel_get",
        "novel_update",
        "novel_delete",
        "novel_set_sort_order",
        "settings_get",
        "settings_update",
        "translation_claim",
        "translation_complete",
        "translation_fail",
        "translation_list",
    ]
}

pub fn dispatch(service: &mut ImportService, op: &str, args: Value) -> Value {
    match op {
        "chapter_import" => import::chapter_import(service, args),
        "chapter_import_batch" => import::chapter_import_batch(service, args),
        "chapter_get" => chapters::chapter_get(service, args),
        "chapter_update" => chapters::chapter_update(service, args),
        "chapter_delete" => chapters::chapter_delete(service, args),
        "novel_list" => novels::novel_list(service, args),
        "novel_get" => novels::novel_get(service, args),
        "novel_update" => novels::novel_update(service, args),
        "novel_delete" => novels::novel_delete(service, args),
        "novel_set_sort_order" => novels::novel_set_sort_order(service, args),
        "settings_get" => settings::settings_get(service, args),
        "settings_update" => settings::settings_update(service, args),
        "translation_claim" => translation::translation_claim(service, args),
        "translation_complete" => translation::translation_complete(service, args),
        "translation_fail" => translation::translation_fail(service, args),
        "translation_list" => translation::translation_list(service, args),
        _ => wire::err("UNKNOWN_OP", 400, format!("unknown op: {op}")),
    }
}
