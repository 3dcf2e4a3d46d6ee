#![forbid(unsafe_code)]

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TranslationJobKind {
    Title,
    Content,
    Full,
}

impl TranslationJobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
            Self::Full => "full",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "title" => Some(Self::Title),
            "content" => Some(Self::Content),
            "full" => Some(Self::Full),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TranslationJobRow {
    pub seq: i64,
    pub owner: String,
    pub novel_id: i64,
    pub chapter_id: i64,
    pub kind: TranslationJobKind,
    pub status: String,
    pub idempotency_key: String,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct TranslationEnqueueOutcome {
    pub job: TranslationJobRow,
    pub deduped: bool,
}
