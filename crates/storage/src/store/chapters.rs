#![forbid(unsafe_code)]

mod delete;
mod get;
mod insert;
mod list;
mod update;

use super::ChapterRow;

pub(crate) const CHAPTER_COLUMNS: &str = "id, novel_id, slug, title, translated_title, \
     chapter_number, content, translated_content, translation_model, \
     translation_status, images_json, source_url, position, is_special, \
     created_at_ms, updated_at_ms";

pub(crate) fn read_chapter_row(row: &rusqlite::Row<'_>) -> Result<ChapterRow, rusqlite::Error> {
    Ok(ChapterRow {
        id: row.get(0)?,
        novel_id: row.get(1)?,
        slug: row.get(2)?,
        title: row.get(3)?,
        translated_title: row.get(4)?,
        chapter_number: row.get(5)?,
        content: row.get(6)?,
        translated_content: row.get(7)?,
        translation_model: row.get(8)?,
        translation_status: row.get(9)?,
        images_json: row.get(10)?,
        source_url: row.get(11)?,
        position: row.get(12)?,
        is_special: row.get::<_, i64>(13)? != 0,
        created_at_ms: row.get(14)?,
        updated_at_ms: row.get(15)?,
    })
}
