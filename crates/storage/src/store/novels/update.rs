#![forbid(unsafe_code)]

use super::super::*;
use ns_core::ids::{NovelSlug, OwnerId};
use crate::store::json::{encode_string_list, validate_json_column};
use rusqlite::params;

impl SqliteStore {
    pub fn novel_update(
        &mut self,
        owner: &OwnerId,
        slug: &NovelSlug,
        request: NovelUpdateRequest,
    ) -> Result<NovelRow, StoreError> {
        if request.is_empty() {
            return Err(StoreError::InvalidInput("no fields to update"));
        }
        let glossary_json = request
            .glossary_json
            .map(|raw| validate_json_column(Some(raw), "glossary_json: expected valid JSON"))
            .transpose()?
            .flatten();

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        novel_ref_tx(&tx, owner, slug)?;

        tx.execute(
            r#"
            UPDATE novels SET
              title = COALESCE(?3, title),
              translated_title = COALESCE(?4, translated_title),
              author = COALESCE(?5, author),
              translated_author = COALESCE(?6, translated_author),
              cover_url = COALESCE(?7, cover_url),
              tags_json = COALESCE(?8, tags_json),
              translated_tags_json = COALESCE(?9, translated_tags_json),
              synopsis = COALESCE(?10, synopsis),
              translated_synopsis = COALESCE(?11, translated_synopsis),
              glossary_json = COALESCE(?12, glossary_json),
              source_url = COALESCE(?13, source_url),
              updated_at_ms = ?14
            WHERE owner=?1 AND slug=?2
            "#,
            params![
                owner.as_str(),
                slug.as_str(),
                request.title,
                request.translated_title,
                request.author,
                request.translated_author,
                request.cover_url,
                request.tags.as_deref().map(encode_string_list),
                request.translated_tags.as_deref().map(encode_string_list),
                request.synopsis,
                request.translated_synopsis,
                glossary_json,
                request.source_url,
                now_ms,
            ],
        )?;

        tx.commit()?;

        match self.novel_get(owner, slug)? {
            Some(row) => Ok(row),
            None => Err(StoreError::NovelNotFound),
        }
    }
}
