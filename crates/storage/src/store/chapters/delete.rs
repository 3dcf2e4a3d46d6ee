#![forbid(unsafe_code)]

use super::super::*;
use ns_core::ids::{NovelSlug, OwnerId};
use rusqlite::{Transaction, params};

impl SqliteStore {
    /// Deletes one chapter and closes the gap it leaves: the remaining
    /// chapters are rewritten to the dense range `0..N-1` in their current
    /// order, inside the same transaction as the delete.
    pub fn chapter_delete(
        &mut self,
        owner: &OwnerId,
        novel_slug: &NovelSlug,
        chapter_id: i64,
    ) -> Result<bool, StoreError> {
        let now_ms = now_ms();
        let tx = self.immediate_tx()?;
        let novel = novel_ref_tx(&tx, owner, novel_slug)?;

        let deleted = tx.execute(
            "DELETE FROM chapters WHERE id=?1 AND novel_id=?2",
            params![chapter_id, novel.id],
        )?;
        if deleted == 0 {
            tx.commit()?;
            return Ok(false);
        }

        renormalize_positions_tx(&tx, novel.id)?;
        touch_novel_tx(&tx, novel.id, now_ms)?;
        tx.commit()?;
        Ok(true)
    }
}

/// Compacts positions to `0..N-1`, ascending. Compacting downward in
/// ascending order never collides with the unique index: each row's target
/// slot is at or below its current one and was vacated by the row before it.
fn renormalize_positions_tx(tx: &Transaction<'_>, novel_id: i64) -> Result<(), StoreError> {
    let remaining: Vec<(i64, i64)> = {
        let mut stmt = tx.prepare(
            "SELECT id, position FROM chapters WHERE novel_id=?1 ORDER BY position ASC",
        )?;
        let rows = stmt.query_map(params![novel_id], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
        })?;
        rows.collect::<Result<Vec<_>, _>>()?
    };

    for (index, (id, position)) in remaining.iter().enumerate() {
        let target = to_sqlite_i64(index)?;
        if *position == target {
            continue;
        }
        tx.execute(
            "UPDATE chapters SET position=?2 WHERE id=?1",
            params![id, target],
        )?;
    }
    Ok(())
}
