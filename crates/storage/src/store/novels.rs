#![forbid(unsafe_code)]

mod create;
mod delete;
mod get;
mod list;
mod sort_order;
mod update;

use super::NovelRow;
use super::json::decode_string_list;
use ns_core::ordering::SortOrder;

pub(crate) const NOVEL_COLUMNS: &str = "id, owner, slug, title, translated_title, author, \
     translated_author, cover_url, tags_json, translated_tags_json, synopsis, \
     translated_synopsis, glossary_json, source_url, sort_order_override, \
     created_at_ms, updated_at_ms, \
     (SELECT COUNT(1) FROM chapters WHERE chapters.novel_id = novels.id)";

pub(crate) fn read_novel_row(row: &rusqlite::Row<'_>) -> Result<NovelRow, rusqlite::Error> {
    let tags_json: Option<String> = row.get(8)?;
    let translated_tags_json: Option<String> = row.get(9)?;
    let sort_order_override: Option<String> = row.get(14)?;
    Ok(NovelRow {
        id: row.get(0)?,
        owner: row.get(1)?,
        slug: row.get(2)?,
        title: row.get(3)?,
        translated_title: row.get(4)?,
        author: row.get(5)?,
        translated_author: row.get(6)?,
        cover_url: row.get(7)?,
        tags: decode_string_list(tags_json),
        translated_tags: decode_string_list(translated_tags_json),
        synopsis: row.get(10)?,
        translated_synopsis: row.get(11)?,
        glossary_json: row.get(12)?,
        source_url: row.get(13)?,
        sort_order_override: sort_order_override.as_deref().and_then(SortOrder::parse),
        created_at_ms: row.get(15)?,
        updated_at_ms: row.get(16)?,
        chapter_count: row.get(17)?,
    })
}
