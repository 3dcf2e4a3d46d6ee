#![forbid(unsafe_code)]

mod chapters;
mod error;
mod json;
mod novels;
mod requests;
mod settings;
mod translation_jobs;
mod types;

pub use error::StoreError;
pub use requests::*;
pub use types::*;

use ns_core::ids::{NovelSlug, OwnerId};
use rusqlite::{Connection, ErrorCode, Transaction, TransactionBehavior, params};
use std::path::{Path, PathBuf};
use std::time::Duration;

const SCHEMA_VERSION: i64 = 1;
const DB_FILENAME: &str = "novelshelf.db";

/// Offset for the temporary negative positions used while shifting a chapter
/// tail. Must exceed any plausible chapter count so the temporary range never
/// collides with a real position or another temporary value.
pub(crate) const SHIFT_OFFSET: i64 = 1_000_000;

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILENAME);
        let conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;",
        )?;

        install_schema(&conn)?;
        Ok(Self { conn, storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Begins a write transaction that takes the SQLite write lock up front.
    /// This is the store's realization of the exclusive parent lock: the
    /// whole read-compute-write span of an insert or delete runs behind it,
    /// and a wait that outlives the busy timeout surfaces as
    /// `ConcurrencyAborted`.
    pub(crate) fn immediate_tx(&mut self) -> Result<Transaction<'_>, StoreError> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}

fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS owners (
          owner TEXT PRIMARY KEY,
          created_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS novels (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          owner TEXT NOT NULL,
          slug TEXT NOT NULL,
          title TEXT NOT NULL,
          translated_title TEXT,
          author TEXT,
          translated_author TEXT,
          cover_url TEXT,
          tags_json TEXT,
          translated_tags_json TEXT,
          synopsis TEXT,
          translated_synopsis TEXT,
          glossary_json TEXT,
          source_url TEXT,
          sort_order_override TEXT,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL,
          UNIQUE(owner, slug),
          FOREIGN KEY(owner) REFERENCES owners(owner) ON DELETE CASCADE,
          CHECK(sort_order_override IS NULL OR sort_order_override IN ('asc', 'desc'))
        );

        CREATE INDEX IF NOT EXISTS idx_novels_owner_created
          ON novels(owner, created_at_ms);

        CREATE TABLE IF NOT EXISTS chapters (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          novel_id INTEGER NOT NULL REFERENCES novels(id) ON DELETE CASCADE,
          slug TEXT NOT NULL,
          title TEXT NOT NULL,
          translated_title TEXT,
          chapter_number TEXT,
          content TEXT NOT NULL,
          translated_content TEXT,
          translation_model TEXT,
          translation_status TEXT NOT NULL DEFAULT 'pending',
          images_json TEXT,
          source_url TEXT,
          position INTEGER NOT NULL,
          is_special INTEGER NOT NULL DEFAULT 0,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL,
          UNIQUE(novel_id, slug),
          UNIQUE(novel_id, position)
        );

        CREATE INDEX IF NOT EXISTS idx_chapters_novel_position
          ON chapters(novel_id, position);

        CREATE TABLE IF NOT EXISTS settings (
          owner TEXT PRIMARY KEY,
          default_sort_order TEXT NOT NULL DEFAULT 'asc',
          max_concurrent_imports INTEGER NOT NULL DEFAULT 3,
          updated_at_ms INTEGER NOT NULL,
          FOREIGN KEY(owner) REFERENCES owners(owner) ON DELETE CASCADE,
          CHECK(default_sort_order IN ('asc', 'desc'))
        );

        CREATE TABLE IF NOT EXISTS translation_jobs (
          seq INTEGER PRIMARY KEY AUTOINCREMENT,
          owner TEXT NOT NULL,
          novel_id INTEGER NOT NULL REFERENCES novels(id) ON DELETE CASCADE,
          chapter_id INTEGER NOT NULL REFERENCES chapters(id) ON DELETE CASCADE,
          kind TEXT NOT NULL,
          status TEXT NOT NULL DEFAULT 'pending',
          idempotency_key TEXT NOT NULL,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL,
          UNIQUE(owner, idempotency_key),
          CHECK(kind IN ('title', 'content', 'full')),
          CHECK(status IN ('pending', 'in_progress', 'completed', 'failed'))
        );

        CREATE INDEX IF NOT EXISTS idx_translation_jobs_pending
          ON translation_jobs(owner, status, seq);
        "#,
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO meta(key, value) VALUES (?1, ?2)",
        params!["schema_version", SCHEMA_VERSION.to_string()],
    )?;
    Ok(())
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct NovelRef {
    pub id: i64,
}

pub(crate) fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration,
        Err(_) => return 0,
    };

    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}

pub(crate) fn ensure_owner_tx(
    tx: &Transaction<'_>,
    owner: &OwnerId,
    now_ms: i64,
) -> Result<(), StoreError> {
    tx.execute(
        "INSERT OR IGNORE INTO owners(owner, created_at_ms) VALUES (?1, ?2)",
        params![owner.as_str(), now_ms],
    )?;
    Ok(())
}

pub(crate) fn novel_ref_tx(
    tx: &Transaction<'_>,
    owner: &OwnerId,
    slug: &NovelSlug,
) -> Result<NovelRef, StoreError> {
    use rusqlite::OptionalExtension;

    let value = tx
        .query_row(
            "SELECT id FROM novels WHERE owner=?1 AND slug=?2",
            params![owner.as_str(), slug.as_str()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;

    match value {
        Some(id) => Ok(NovelRef { id }),
        None => Err(StoreError::NovelNotFound),
    }
}

pub(crate) fn touch_novel_tx(
    tx: &Transaction<'_>,
    novel_id: i64,
    now_ms: i64,
) -> Result<(), StoreError> {
    tx.execute(
        "UPDATE novels SET updated_at_ms=?2 WHERE id=?1",
        params![novel_id, now_ms],
    )?;
    Ok(())
}

pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, message) => {
            code.code == ErrorCode::ConstraintViolation
                || message.as_deref().is_some_and(|value| {
                    value.contains("UNIQUE constraint failed")
                        || value.contains("PRIMARY KEY constraint failed")
                })
        }
        _ => false,
    }
}

pub(crate) fn to_sqlite_i64(value: usize) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::InvalidInput("numeric overflow"))
}
