#![forbid(unsafe_code)]

use super::super::*;
use ns_core::ids::{NovelSlug, OwnerId};
use crate::store::json::{encode_string_list, validate_json_column};
use rusqlite::params;

impl SqliteStore {
    pub fn novel_create(
        &mut self,
        owner: &OwnerId,
        request: NovelCreateRequest,
    ) -> Result<NovelRow, StoreError> {
        let slug = NovelSlug::try_new(request.slug)
            .map_err(|_| StoreError::InvalidInput("invalid novel slug"))?;
        if request.title.trim().is_empty() {
            return Err(StoreError::InvalidInput("title must not be empty"));
        }
        let glossary_json = validate_json_column(
            request.glossary_json,
            "glossary_json: expected valid JSON",
        )?;

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        ensure_owner_tx(&tx, owner, now_ms)?;

        let insert = tx.execute(
            r#"
            INSERT INTO novels(
              owner, slug, title, translated_title, author, translated_author,
              cover_url, tags_json, translated_tags_json, synopsis,
              translated_synopsis, glossary_json, source_url, created_at_ms,
              updated_at_ms
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)
            "#,
            params![
                owner.as_str(),
                slug.as_str(),
                request.title,
                request.translated_title,
                request.author,
                request.translated_author,
                request.cover_url,
                encode_string_list(&request.tags),
                encode_string_list(&request.translated_tags),
                request.synopsis,
                request.translated_synopsis,
                glossary_json,
                request.source_url,
                now_ms,
            ],
        );

        if let Err(err) = insert {
            if is_constraint_violation(&err) {
                return Err(StoreError::DuplicateSlug);
            }
            return Err(err.into());
        }

        let id = tx.last_insert_rowid();
        tx.commit()?;

        match self.novel_get(owner, &slug)? {
            Some(row) => Ok(row),
            None => {
                tracing::warn!(novel_id = id, "novel row vanished after create");
                Err(StoreError::NovelNotFound)
            }
        }
    }
}
