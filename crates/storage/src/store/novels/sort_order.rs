#![forbid(unsafe_code)]

use super::super::*;
use ns_core::ids::{NovelSlug, OwnerId};
use ns_core::ordering::SortOrder;
use rusqlite::params;

impl SqliteStore {
    /// Sets or clears the per-novel display override. `None` restores the
    /// owner's default. Stored positions are untouched.
    pub fn novel_set_sort_order(
        &mut self,
        owner: &OwnerId,
        slug: &NovelSlug,
        order: Option<SortOrder>,
    ) -> Result<(), StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let updated = tx.execute(
            "UPDATE novels SET sort_order_override=?3, updated_at_ms=?4 WHERE owner=?1 AND slug=?2",
            params![
                owner.as_str(),
                slug.as_str(),
                order.map(|value| value.as_str()),
                now_ms
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::NovelNotFound);
        }

        tx.commit()?;
        Ok(())
    }
}
