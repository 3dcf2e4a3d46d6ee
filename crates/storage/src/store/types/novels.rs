#![forbid(unsafe_code)]

use ns_core::ordering::SortOrder;

#[derive(Clone, Debug)]
pub struct NovelRow {
    pub id: i64,
    pub owner: String,
    pub slug: String,
    pub title: String,
    pub translated_title: Option<String>,
    pub author: Option<String>,
    pub translated_author: Option<String>,
    pub cover_url: Option<String>,
    pub tags: Vec<String>,
    pub translated_tags: Vec<String>,
    pub synopsis: Option<String>,
    pub translated_synopsis: Option<String>,
    pub glossary_json: Option<String>,
    pub source_url: Option<String>,
    pub sort_order_override: Option<SortOrder>,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
    pub chapter_count: i64,
}

impl NovelRow {
    /// Effective display direction: the per-novel override wins, otherwise
    /// the owner's default applies.
    pub fn effective_sort_order(&self, default: SortOrder) -> SortOrder {
        self.sort_order_override.unwrap_or(default)
    }
}
