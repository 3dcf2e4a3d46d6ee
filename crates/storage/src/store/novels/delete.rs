#![forbid(unsafe_code)]

use super::super::*;
use ns_core::ids::{NovelSlug, OwnerId};
use rusqlite::params;

impl SqliteStore {
    /// Deletes the novel and, through the cascading foreign keys, every
    /// chapter and translation job under it.
    pub fn novel_delete(&mut self, owner: &OwnerId, slug: &NovelSlug) -> Result<bool, StoreError> {
        let tx = self.immediate_tx()?;
        let deleted = tx.execute(
            "DELETE FROM novels WHERE owner=?1 AND slug=?2",
            params![owner.as_str(), slug.as_str()],
        )?;
        tx.commit()?;
        Ok(deleted > 0)
    }
}
