#![forbid(unsafe_code)]

use super::TranslationJobKind;
use ns_core::ordering::SortOrder;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NovelCreateRequest {
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
}

/// Field merge: `Some` sets, `None` leaves the stored value alone. Matches
/// the import flow, which only forwards metadata the scraper provided.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NovelUpdateRequest {
    pub title: Option<String>,
    pub translated_title: Option<String>,
    pub author: Option<String>,
    pub translated_author: Option<String>,
    pub cover_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub translated_tags: Option<Vec<String>>,
    pub synopsis: Option<String>,
    pub translated_synopsis: Option<String>,
    pub glossary_json: Option<String>,
    pub source_url: Option<String>,
}

impl NovelUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.translated_title.is_none()
            && self.author.is_none()
            && self.translated_author.is_none()
            && self.cover_url.is_none()
            && self.tags.is_none()
            && self.translated_tags.is_none()
            && self.synopsis.is_none()
            && self.translated_synopsis.is_none()
            && self.glossary_json.is_none()
            && self.source_url.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChapterImportRequest {
    pub slug: String,
    pub title: String,
    pub translated_title: Option<String>,
    pub chapter_number: Option<String>,
    pub content: String,
    pub images_json: Option<String>,
    pub source_url: Option<String>,
    /// Explicit storage position. When present it is used verbatim as the
    /// insertion index; the sequencer is bypassed.
    pub position: Option<i64>,
    pub is_special: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChapterUpdateRequest {
    pub title: Option<String>,
    pub translated_title: Option<String>,
    pub chapter_number: Option<String>,
    pub content: Option<String>,
    pub translated_content: Option<String>,
    pub translation_model: Option<String>,
    pub translation_status: Option<String>,
    pub images_json: Option<String>,
}

impl ChapterUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.translated_title.is_none()
            && self.chapter_number.is_none()
            && self.content.is_none()
            && self.translated_content.is_none()
            && self.translation_model.is_none()
            && self.translation_status.is_none()
            && self.images_json.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslationEnqueueRequest {
    pub chapter_id: i64,
    pub kind: TranslationJobKind,
    pub idempotency_key: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TranslationCompleteRequest {
    pub translated_title: Option<String>,
    pub translated_content: Option<String>,
    pub translation_model: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettingsUpdateRequest {
    pub default_sort_order: Option<SortOrder>,
    pub max_concurrent_imports: Option<u32>,
}
