#![forbid(unsafe_code)]

use rusqlite::ErrorCode;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    InvalidInput(&'static str),
    NovelNotFound,
    ChapterNotFound,
    DuplicateSlug,
    JobNotFound,
    /// The write transaction could not take or keep the storage lock within
    /// the busy timeout. Nothing was committed; callers may retry.
    ConcurrencyAborted,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::NovelNotFound => write!(f, "novel not found"),
            Self::ChapterNotFound => write!(f, "chapter not found"),
            Self::DuplicateSlug => write!(f, "novel slug already exists"),
            Self::JobNotFound => write!(f, "translation job not found"),
            Self::ConcurrencyAborted => write!(f, "storage transaction aborted, retry"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, _) = &value {
            if matches!(
                code.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
            ) {
                return Self::ConcurrencyAborted;
            }
        }
        Self::Sql(value)
    }
}
