#![forbid(unsafe_code)]

use super::super::*;
use super::{CHAPTER_COLUMNS, read_chapter_row};
use ns_core::ids::OwnerId;
use rusqlite::{OptionalExtension, params};

impl SqliteStore {
    pub fn chapter_get(
        &self,
        owner: &OwnerId,
        chapter_id: i64,
    ) -> Result<Option<ChapterRow>, StoreError> {
        let sql = format!(
            "SELECT {columns} FROM chapters \
             JOIN novels ON novels.id = chapters.novel_id \
             WHERE chapters.id=?1 AND novels.owner=?2",
            columns = qualified_chapter_columns()
        );
        Ok(self
            .conn
            .query_row(&sql, params![chapter_id, owner.as_str()], read_chapter_row)
            .optional()?)
    }
}

fn qualified_chapter_columns() -> String {
    CHAPTER_COLUMNS
        .split(',')
        .map(|column| format!("chapters.{}", column.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}
