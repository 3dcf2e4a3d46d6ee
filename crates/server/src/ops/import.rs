#![forbid(unsafe_code)]

use super::args;
use crate::service::{ChapterImportPayload, ImportService};
use crate::wire;
use serde_json::{Value, json};

pub(crate) fn chapter_import(service: &mut ImportService, args: Value) -> Value {
    let payload: ChapterImportPayload = match serde_json::from_value(args) {
        Ok(payload) => payload,
        Err(err) => {
            return wire::err("INVALID_INPUT", 400, format!("malformed payload: {err}"));
        }
    };

    match service.import_chapter(payload) {
        Ok(report) => wire::ok(json!({
            "message": if report.is_overview {
                "Novel metadata captured from overview page"
            } else if report.already_exists {
                "Chapter already exists - skipped"
            } else {
                "Chapter imported successfully"
            },
            "already_exists": report.already_exists,
            "is_overview": report.is_overview,
            "novel_id": report.novel_slug,
            "chapter_id": report.chapter_id,
            "chapter_index": report.chapter_index,
            "translation_queued": report.translation_queued,
        })),
        Err(err) => wire::service_error(&err),
    }
}

pub(crate) fn chapter_import_batch(service: &mut ImportService, args: Value) -> Value {
    let owner = match args::require_str(&args, "owner") {
        Ok(value) => value.to_string(),
        Err(response) => return response,
    };
    let max_concurrent = args::optional_u32(&args, "max_concurrent_imports");
    let Some(chapter_values) = args.get("chapters").and_then(Value::as_array) else {
        return wire::err("INVALID_INPUT", 400, "chapters must be an array");
    };

    let mut chapters = Vec::with_capacity(chapter_values.len());
    for value in chapter_values {
        match serde_json::from_value::<ChapterImportPayload>(value.clone()) {
            Ok(payload) => chapters.push(payload),
            Err(err) => {
                return wire::err("INVALID_INPUT", 400, format!("malformed chapter: {err}"));
            }
        }
    }

    let total = chapters.len();
    match service.import_batch(&owner, chapters, max_concurrent) {
        Ok(reports) => {
            let mut successful = 0usize;
            let mut failed = 0usize;
            let results: Vec<Value> = reports
                .into_iter()
                .map(|report| match report.result {
                    Ok((novel_slug, chapter_index, already_exists)) => {
                        successful += 1;
                        json!({
                            "index": report.index,
                            "success": true,
                            "chapter_title": report.chapter_title,
                            "already_exists": already_exists,
                            "data": {
                                "novel_id": novel_slug,
                                "chapter_index": chapter_index,
                            },
                        })
                    }
                    Err(error) => {
                        failed += 1;
                        json!({
                            "index": report.index,
                            "success": false,
                            "chapter_title": report.chapter_title,
                            "error": error,
                        })
                    }
                })
                .collect();

            wire::ok(json!({
                "total": total,
                "successful": successful,
                "failed": failed,
                "results": results,
            }))
        }
        Err(err) => wire::service_error(&err),
    }
}
