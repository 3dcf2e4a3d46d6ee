#![forbid(unsafe_code)]

use super::super::*;
use crate::store::json::validate_json_column;
use ns_core::ids::OwnerId;
use rusqlite::{OptionalExtension, params};

const TRANSLATION_STATUSES: [&str; 4] = ["pending", "in_progress", "completed", "failed"];

impl SqliteStore {
    /// Merges content and translation fields into one chapter. Positions are
    /// never touched here; only insertion and deletion move chapters.
    pub fn chapter_update(
        &mut self,
        owner: &OwnerId,
        chapter_id: i64,
        request: ChapterUpdateRequest,
    ) -> Result<ChapterRow, StoreError> {
        if request.is_empty() {
            return Err(StoreError::InvalidInput("no fields to update"));
        }
        if let Some(status) = request.translation_status.as_deref() {
            if !TRANSLATION_STATUSES.contains(&status) {
                return Err(StoreError::InvalidInput(
                    "translation_status must be pending|in_progress|completed|failed",
                ));
            }
        }
        let images_json = request
            .images_json
            .map(|raw| validate_json_column(Some(raw), "images_json: expected valid JSON"))
            .transpose()?
            .flatten();

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let owned = tx
            .query_row(
                "SELECT 1 FROM chapters \
                 JOIN novels ON novels.id = chapters.novel_id \
                 WHERE chapters.id=?1 AND novels.owner=?2",
                params![chapter_id, owner.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .is_some();
        if !owned {
            return Err(StoreError::ChapterNotFound);
        }

        tx.execute(
            r#"
            UPDATE chapters SET
              title = COALESCE(?2, title),
              translated_title = COALESCE(?3, translated_title),
              chapter_number = COALESCE(?4, chapter_number),
              content = COALESCE(?5, content),
              translated_content = COALESCE(?6, translated_content),
              translation_model = COALESCE(?7, translation_model),
              translation_status = COALESCE(?8, translation_status),
              images_json = COALESCE(?9, images_json),
              updated_at_ms = ?10
            WHERE id=?1
            "#,
            params![
                chapter_id,
                request.title,
                request.translated_title,
                request.chapter_number,
                request.content,
                request.translated_content,
                request.translation_model,
                request.translation_status,
                images_json,
                now_ms,
            ],
        )?;

        tx.commit()?;

        match self.chapter_get(owner, chapter_id)? {
            Some(row) => Ok(row),
            None => Err(StoreError::ChapterNotFound),
        }
    }
}
