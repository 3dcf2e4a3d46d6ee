#![forbid(unsafe_code)]

use super::super::*;
use ns_core::ids::OwnerId;
use super::{NOVEL_COLUMNS, read_novel_row};
use rusqlite::params;

impl SqliteStore {
    pub fn novel_list(
        &self,
        owner: &OwnerId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<NovelRow>, StoreError> {
        let limit = to_sqlite_i64(limit)?;
        let offset = to_sqlite_i64(offset)?;

        let sql = format!(
            "SELECT {NOVEL_COLUMNS} FROM novels \
             WHERE owner=?1 \
             ORDER BY created_at_ms DESC, slug ASC \
             LIMIT ?2 OFFSET ?3"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![owner.as_str(), limit, offset], read_novel_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
