#![forbid(unsafe_code)]

use super::super::*;
use super::{CHAPTER_COLUMNS, read_chapter_row};
use ns_core::ids::{NovelSlug, OwnerId};
use rusqlite::params;

impl SqliteStore {
    /// All chapters of a novel in storage order (ascending position). Display
    /// reordering is the caller's concern; this read takes no write lock.
    pub fn chapter_list(
        &self,
        owner: &OwnerId,
        novel_slug: &NovelSlug,
    ) -> Result<Vec<ChapterRow>, StoreError> {
        use rusqlite::OptionalExtension;

        let novel_id = self
            .conn
            .query_row(
                "SELECT id FROM novels WHERE owner=?1 AND slug=?2",
                params![owner.as_str(), novel_slug.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .ok_or(StoreError::NovelNotFound)?;

        let sql = format!(
            "SELECT {CHAPTER_COLUMNS} FROM chapters \
             WHERE novel_id=?1 ORDER BY position ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![novel_id], read_chapter_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
