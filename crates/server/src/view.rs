#![forbid(unsafe_code)]

use ns_core::ordering::{SortOrder, ordering_key_from_url};
use ns_storage::{ChapterRow, NovelRow, OwnerSettingsRow, TranslationJobRow};
use serde_json::{Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Presentation mapping for a novel row. Storage keeps one canonical
/// `cover_url`; the wire shape also carries the legacy `cover` and
/// `novel_source_url` names older extension builds still read.
pub fn novel_json(novel: &NovelRow, default_sort_order: SortOrder) -> Value {
    json!({
        "id": novel.id,
        "owner": novel.owner,
        "slug": novel.slug,
        "title": novel.title,
        "translated_title": novel.translated_title,
        "author": novel.author,
        "translated_author": novel.translated_author,
        "cover_url": novel.cover_url,
        "cover": novel.cover_url,
        "tags": novel.tags,
        "translated_tags": novel.translated_tags,
        "synopsis": novel.synopsis,
        "translated_synopsis": novel.translated_synopsis,
        "glossary": glossary_value(novel),
        "source_url": novel.source_url,
        "novel_source_url": novel.source_url,
        "sort_order": novel.effective_sort_order(default_sort_order).as_str(),
        "sort_order_override": novel.sort_order_override.map(|order| order.as_str()),
        "chapter_count": novel.chapter_count,
        "created_at": rfc3339_ms(novel.created_at_ms),
        "updated_at": rfc3339_ms(novel.updated_at_ms),
    })
}

pub fn chapter_json(
    chapter: &ChapterRow,
    display_index: Option<usize>,
    include_content: bool,
) -> Value {
    let mut value = json!({
        "id": chapter.id,
        "novel_id": chapter.novel_id,
        "slug": chapter.slug,
        "title": chapter.title,
        "translated_title": chapter.translated_title.as_deref().unwrap_or(&chapter.title),
        "chapter_number": chapter.chapter_number,
        "images": images_value(chapter),
        "source_url": chapter.source_url,
        "ordering_key": chapter.source_url.as_deref().and_then(ordering_key_from_url),
        "position": chapter.position,
        "is_special": chapter.is_special,
        "translation_status": chapter.translation_status,
        "translation_model": chapter.translation_model,
        "created_at": rfc3339_ms(chapter.created_at_ms),
        "updated_at": rfc3339_ms(chapter.updated_at_ms),
    });
    if let Some(object) = value.as_object_mut() {
        if let Some(index) = display_index {
            object.insert("display_index".to_string(), json!(index));
        }
        if include_content {
            object.insert("content".to_string(), json!(chapter.content));
            object.insert(
                "translated_content".to_string(),
                json!(chapter.translated_content),
            );
        }
    }
    value
}

pub fn settings_json(settings: &OwnerSettingsRow) -> Value {
    json!({
        "default_sort_order": settings.default_sort_order.as_str(),
        "max_concurrent_imports": settings.max_concurrent_imports,
    })
}

pub fn job_json(job: &TranslationJobRow) -> Value {
    json!({
        "seq": job.seq,
        "owner": job.owner,
        "novel_id": job.novel_id,
        "chapter_id": job.chapter_id,
        "kind": job.kind.as_str(),
        "status": job.status,
        "idempotency_key": job.idempotency_key,
        "created_at": rfc3339_ms(job.created_at_ms),
        "updated_at": rfc3339_ms(job.updated_at_ms),
    })
}

fn glossary_value(novel: &NovelRow) -> Value {
    novel
        .glossary_json
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_else(|| json!({}))
}

fn images_value(chapter: &ChapterRow) -> Value {
    chapter
        .images_json
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_else(|| json!([]))
}

fn rfc3339_ms(ms: i64) -> Option<String> {
    let nanos = i128::from(ms) * 1_000_000;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|datetime| datetime.format(&Rfc3339).ok())
}
