#![forbid(unsafe_code)]

use ns_core::ordering::SiblingOrder;

#[derive(Clone, Debug)]
pub struct ChapterRow {
    pub id: i64,
    pub novel_id: i64,
    pub slug: String,
    pub title: String,
    pub translated_title: Option<String>,
    pub chapter_number: Option<String>,
    pub content: String,
    pub translated_content: Option<String>,
    pub translation_model: Option<String>,
    pub translation_status: String,
    pub images_json: Option<String>,
    pub source_url: Option<String>,
    pub position: i64,
    pub is_special: bool,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

impl ChapterRow {
    pub fn sibling_order(&self) -> SiblingOrder {
        SiblingOrder::derive(self.source_url.as_deref(), self.chapter_number.as_deref())
    }
}

/// Result of an import attempt. `already_exists` marks the idempotent no-op
/// path: the returned id/position belong to the chapter imported earlier.
#[derive(Clone, Copy, Debug)]
pub struct ChapterImportOutcome {
    pub chapter_id: i64,
    pub novel_id: i64,
    pub position: i64,
    pub already_exists: bool,
}
