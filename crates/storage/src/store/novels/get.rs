#![forbid(unsafe_code)]

use super::super::*;
use ns_core::ids::{NovelSlug, OwnerId};
use super::{NOVEL_COLUMNS, read_novel_row};
use rusqlite::{OptionalExtension, params};

impl SqliteStore {
    pub fn novel_get(
        &self,
        owner: &OwnerId,
        slug: &NovelSlug,
    ) -> Result<Option<NovelRow>, StoreError> {
        let sql = format!("SELECT {NOVEL_COLUMNS} FROM novels WHERE owner=?1 AND slug=?2");
        Ok(self
            .conn
            .query_row(&sql, params![owner.as_str(), slug.as_str()], read_novel_row)
            .optional()?)
    }

    pub fn novel_find_by_source_url(
        &self,
        owner: &OwnerId,
        source_url: &str,
    ) -> Result<Option<NovelRow>, StoreError> {
        if source_url.trim().is_empty() {
            return Ok(None);
        }
        let sql = format!(
            "SELECT {NOVEL_COLUMNS} FROM novels \
             WHERE owner=?1 AND source_url=?2 \
             ORDER BY created_at_ms ASC LIMIT 1"
        );
        Ok(self
            .conn
            .query_row(&sql, params![owner.as_str(), source_url], read_novel_row)
            .optional()?)
    }

    /// Matches either the source-language or the translated title, the two
    /// names the scraping agent may know a novel by.
    pub fn novel_find_by_title(
        &self,
        owner: &OwnerId,
        title: &str,
    ) -> Result<Option<NovelRow>, StoreError> {
        if title.trim().is_empty() {
            return Ok(None);
        }
        let sql = format!(
            "SELECT {NOVEL_COLUMNS} FROM novels \
             WHERE owner=?1 AND (title=?2 OR translated_title=?2) \
             ORDER BY created_at_ms ASC LIMIT 1"
        );
        Ok(self
            .conn
            .query_row(&sql, params![owner.as_str(), title], read_novel_row)
            .optional()?)
    }
}
