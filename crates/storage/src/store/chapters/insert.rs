#![forbid(unsafe_code)]

use super::super::*;
use crate::store::json::validate_json_column;
use ns_core::ids::{NovelSlug, OwnerId};
use ns_core::ordering::{SiblingOrder, insertion_index};
use rusqlite::{OptionalExtension, Transaction, params};

impl SqliteStore {
    /// Imports one chapter under the given novel, assigning it a storage
    /// position so that positions stay the dense range `0..N`.
    ///
    /// The whole operation runs behind one immediate transaction: the
    /// duplicate check, the position computation, the tail shift, and the
    /// insert either all commit or all roll back. Re-importing a source URL
    /// that is already present returns the existing chapter with
    /// `already_exists` set and writes nothing.
    pub fn chapter_import(
        &mut self,
        owner: &OwnerId,
        novel_slug: &NovelSlug,
        request: ChapterImportRequest,
    ) -> Result<ChapterImportOutcome, StoreError> {
        if request.slug.trim().is_empty() {
            return Err(StoreError::InvalidInput("chapter slug must not be empty"));
        }
        if request.title.trim().is_empty() {
            return Err(StoreError::InvalidInput("chapter title must not be empty"));
        }
        let images_json =
            validate_json_column(request.images_json, "images_json: expected valid JSON")?;

        let now_ms = now_ms();
        let tx = self.immediate_tx()?;
        let novel = novel_ref_tx(&tx, owner, novel_slug)?;

        if let Some(source_url) = request.source_url.as_deref() {
            if let Some((chapter_id, position)) =
                find_chapter_by_source_tx(&tx, novel.id, source_url)?
            {
                tx.commit()?;
                return Ok(ChapterImportOutcome {
                    chapter_id,
                    novel_id: novel.id,
                    position,
                    already_exists: true,
                });
            }
        }

        let siblings = sibling_order_tx(&tx, novel.id)?;
        let insert_index = match request.position {
            Some(position) => {
                let position = usize::try_from(position)
                    .map_err(|_| StoreError::InvalidInput("position must not be negative"))?;
                if position > siblings.len() {
                    return Err(StoreError::InvalidInput("position out of range"));
                }
                position
            }
            None => {
                let new_order = SiblingOrder::derive(
                    request.source_url.as_deref(),
                    request.chapter_number.as_deref(),
                );
                if request.source_url.is_some() && new_order.ordering_key.is_none() {
                    tracing::debug!(
                        novel_id = novel.id,
                        "source url carries no ordering key, using chapter number"
                    );
                }
                insertion_index(&siblings, &new_order)
            }
        };

        if insert_index < siblings.len() {
            shift_tail_tx(&tx, novel.id, to_sqlite_i64(insert_index)?)?;
        }

        let insert = tx.execute(
            r#"
            INSERT INTO chapters(
              novel_id, slug, title, translated_title, chapter_number, content,
              translation_status, images_json, source_url, position, is_special,
              created_at_ms, updated_at_ms
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'pending', ?7, ?8, ?9, ?10, ?11, ?11)
            "#,
            params![
                novel.id,
                request.slug,
                request.title,
                request.translated_title,
                request.chapter_number,
                request.content,
                images_json,
                request.source_url,
                to_sqlite_i64(insert_index)?,
                request.is_special as i64,
                now_ms,
            ],
        );
        if let Err(err) = insert {
            if is_constraint_violation(&err) {
                return Err(StoreError::InvalidInput(
                    "chapter slug already exists under this novel",
                ));
            }
            return Err(err.into());
        }

        let chapter_id = tx.last_insert_rowid();
        touch_novel_tx(&tx, novel.id, now_ms)?;
        tx.commit()?;

        Ok(ChapterImportOutcome {
            chapter_id,
            novel_id: novel.id,
            position: to_sqlite_i64(insert_index)?,
            already_exists: false,
        })
    }
}

fn find_chapter_by_source_tx(
    tx: &Transaction<'_>,
    novel_id: i64,
    source_url: &str,
) -> Result<Option<(i64, i64)>, StoreError> {
    Ok(tx
        .query_row(
            "SELECT id, position FROM chapters WHERE novel_id=?1 AND source_url=?2",
            params![novel_id, source_url],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )
        .optional()?)
}

fn sibling_order_tx(
    tx: &Transaction<'_>,
    novel_id: i64,
) -> Result<Vec<SiblingOrder>, StoreError> {
    let mut stmt = tx.prepare(
        "SELECT source_url, chapter_number FROM chapters \
         WHERE novel_id=?1 ORDER BY position ASC",
    )?;
    let mut rows = stmt.query(params![novel_id])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let source_url: Option<String> = row.get(0)?;
        let chapter_number: Option<String> = row.get(1)?;
        out.push(SiblingOrder::derive(
            source_url.as_deref(),
            chapter_number.as_deref(),
        ));
    }
    Ok(out)
}

/// Moves every chapter at `insert_index` or above one slot up without ever
/// tripping the `(novel_id, position)` unique index. SQLite checks the index
/// per row, so a direct `position = position + 1` over the tail collides with
/// the neighbor still sitting at the next slot. Pass 1 parks the tail in a
/// disjoint negative range; pass 2 recovers each original position from the
/// parked value and writes the final `original + 1`.
fn shift_tail_tx(
    tx: &Transaction<'_>,
    novel_id: i64,
    insert_index: i64,
) -> Result<(), StoreError> {
    let parked = tx.execute(
        "UPDATE chapters SET position = -(position + ?3) \
         WHERE novel_id=?1 AND position >= ?2",
        params![novel_id, insert_index, SHIFT_OFFSET],
    )?;
    tx.execute(
        "UPDATE chapters SET position = -position - ?2 + 1 \
         WHERE novel_id=?1 AND position < 0",
        params![novel_id, SHIFT_OFFSET],
    )?;
    tracing::debug!(novel_id, insert_index, shifted = parked, "shifted chapter tail");
    Ok(())
}
