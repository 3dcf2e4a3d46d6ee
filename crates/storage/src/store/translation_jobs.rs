#![forbid(unsafe_code)]

use super::*;
use ns_core::ids::OwnerId;
use rusqlite::{OptionalExtension, Transaction, params};

fn read_job_row(row: &rusqlite::Row<'_>) -> Result<TranslationJobRow, rusqlite::Error> {
    let kind: String = row.get(4)?;
    Ok(TranslationJobRow {
        seq: row.get(0)?,
        owner: row.get(1)?,
        novel_id: row.get(2)?,
        chapter_id: row.get(3)?,
        kind: TranslationJobKind::parse(&kind).unwrap_or(TranslationJobKind::Full),
        status: row.get(5)?,
        idempotency_key: row.get(6)?,
        created_at_ms: row.get(7)?,
        updated_at_ms: row.get(8)?,
    })
}

const JOB_COLUMNS: &str =
    "seq, owner, novel_id, chapter_id, kind, status, idempotency_key, created_at_ms, updated_at_ms";

impl SqliteStore {
    /// Queues a translation job for a chapter. Publishing the same
    /// idempotency key twice returns the first job with `deduped` set; the
    /// queue never holds duplicates for one key.
    pub fn translation_enqueue(
        &mut self,
        owner: &OwnerId,
        request: TranslationEnqueueRequest,
    ) -> Result<TranslationEnqueueOutcome, StoreError> {
        let idempotency_key = request.idempotency_key.trim().to_string();
        if idempotency_key.is_empty() {
            return Err(StoreError::InvalidInput(
                "idempotency_key must not be empty",
            ));
        }

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let novel_id = tx
            .query_row(
                "SELECT chapters.novel_id FROM chapters \
                 JOIN novels ON novels.id = chapters.novel_id \
                 WHERE chapters.id=?1 AND novels.owner=?2",
                params![request.chapter_id, owner.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .ok_or(StoreError::ChapterNotFound)?;

        let inserted = tx.execute(
            r#"
            INSERT OR IGNORE INTO translation_jobs(
              owner, novel_id, chapter_id, kind, status, idempotency_key,
              created_at_ms, updated_at_ms
            )
            VALUES (?1, ?2, ?3, ?4, 'pending', ?5, ?6, ?6)
            "#,
            params![
                owner.as_str(),
                novel_id,
                request.chapter_id,
                request.kind.as_str(),
                idempotency_key,
                now_ms,
            ],
        )?;

        let job = {
            let sql = format!(
                "SELECT {JOB_COLUMNS} FROM translation_jobs \
                 WHERE owner=?1 AND idempotency_key=?2"
            );
            tx.query_row(&sql, params![owner.as_str(), idempotency_key], read_job_row)
                .optional()?
                .ok_or(StoreError::JobNotFound)?
        };

        tx.commit()?;
        Ok(TranslationEnqueueOutcome {
            job,
            deduped: inserted == 0,
        })
    }

    /// Hands the oldest pending job to a worker, marking both the job and its
    /// chapter as in progress. Returns `None` when the queue is drained.
    pub fn translation_claim(
        &mut self,
        owner: &OwnerId,
    ) -> Result<Option<TranslationJobRow>, StoreError> {
        let now_ms = now_ms();
        let tx = self.immediate_tx()?;

        let job = {
            let sql = format!(
                "SELECT {JOB_COLUMNS} FROM translation_jobs \
                 WHERE owner=?1 AND status='pending' \
                 ORDER BY seq ASC LIMIT 1"
            );
            tx.query_row(&sql, params![owner.as_str()], read_job_row)
                .optional()?
        };
        let Some(mut job) = job else {
            tx.commit()?;
            return Ok(None);
        };

        set_job_status_tx(&tx, job.seq, "in_progress", now_ms)?;
        tx.execute(
            "UPDATE chapters SET translation_status='in_progress', updated_at_ms=?2 WHERE id=?1",
            params![job.chapter_id, now_ms],
        )?;
        tx.commit()?;

        job.status = "in_progress".to_string();
        job.updated_at_ms = now_ms;
        Ok(Some(job))
    }

    /// Stores the worker's result and completes the job: the chapter receives
    /// the translated fields and flips to `completed`.
    pub fn translation_complete(
        &mut self,
        owner: &OwnerId,
        seq: i64,
        request: TranslationCompleteRequest,
    ) -> Result<TranslationJobRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.immediate_tx()?;
        let mut job = job_by_seq_tx(&tx, owner, seq)?;

        set_job_status_tx(&tx, seq, "completed", now_ms)?;
        tx.execute(
            r#"
            UPDATE chapters SET
              translated_title = COALESCE(?2, translated_title),
              translated_content = COALESCE(?3, translated_content),
              translation_model = COALESCE(?4, translation_model),
              translation_status = 'completed',
              updated_at_ms = ?5
            WHERE id=?1
            "#,
            params![
                job.chapter_id,
                request.translated_title,
                request.translated_content,
                request.translation_model,
                now_ms,
            ],
        )?;
        tx.commit()?;

        job.status = "completed".to_string();
        job.updated_at_ms = now_ms;
        Ok(job)
    }

    pub fn translation_fail(
        &mut self,
        owner: &OwnerId,
        seq: i64,
    ) -> Result<TranslationJobRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.immediate_tx()?;
        let mut job = job_by_seq_tx(&tx, owner, seq)?;

        set_job_status_tx(&tx, seq, "failed", now_ms)?;
        tx.execute(
            "UPDATE chapters SET translation_status='failed', updated_at_ms=?2 WHERE id=?1",
            params![job.chapter_id, now_ms],
        )?;
        tx.commit()?;

        job.status = "failed".to_string();
        job.updated_at_ms = now_ms;
        Ok(job)
    }

    pub fn translation_list(
        &self,
        owner: &OwnerId,
        status: Option<&str>,
        limit: usize,
    ) -> Result<Vec<TranslationJobRow>, StoreError> {
        let limit = to_sqlite_i64(limit)?;
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM translation_jobs \
             WHERE owner=?1 AND (?2 IS NULL OR status=?2) \
             ORDER BY seq ASC LIMIT ?3"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![owner.as_str(), status, limit], read_job_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn job_by_seq_tx(
    tx: &Transaction<'_>,
    owner: &OwnerId,
    seq: i64,
) -> Result<TranslationJobRow, StoreError> {
    let sql = format!("SELECT {JOB_COLUMNS} FROM translation_jobs WHERE owner=?1 AND seq=?2");
    tx.query_row(&sql, params![owner.as_str(), seq], read_job_row)
        .optional()?
        .ok_or(StoreError::JobNotFound)
}

fn set_job_status_tx(
    tx: &Transaction<'_>,
    seq: i64,
    status: &str,
    now_ms: i64,
) -> Result<(), StoreError> {
    tx.execute(
        "UPDATE translation_jobs SET status=?2, updated_at_ms=?3 WHERE seq=?1",
        params![seq, status, now_ms],
    )?;
    Ok(())
}
