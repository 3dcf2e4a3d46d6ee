#![forbid(unsafe_code)]

use crate::gate::ImportGate;
use ns_core::ids::{NovelSlug, OwnerId};
use ns_core::ordering::SortOrder;
use ns_storage::{
    ChapterImportRequest, MAX_CONCURRENT_IMPORTS, MIN_CONCURRENT_IMPORTS, NovelCreateRequest,
    NovelRow, NovelUpdateRequest, SqliteStore, StoreError, TranslationEnqueueRequest,
    TranslationJobKind,
};
use serde::Deserialize;
use sha2::{Digest, Sha256};

#[derive(Debug)]
pub enum ServiceError {
    RateLimited { max_concurrent: u32 },
    InvalidInput(String),
    Store(StoreError),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimited { max_concurrent } => write!(
                f,
                "too many concurrent imports (maximum allowed: {max_concurrent})"
            ),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// One chapter as the scraping agent delivers it. Chapter fields and novel
/// metadata arrive mixed in a single payload; the novel fields are applied
/// to the parent on every import that carries them.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChapterImportPayload {
    pub owner: String,
    pub original_title: Option<String>,
    pub chapter_title: Option<String>,
    pub translated_chapter_title: Option<String>,
    pub chapter_number: Option<String>,
    pub content: Option<String>,
    pub source_url: Option<String>,
    pub novel_source_url: Option<String>,
    pub images: Option<serde_json::Value>,
    pub position: Option<i64>,
    pub is_special: Option<bool>,
    pub auto_translate: Option<bool>,
    pub max_concurrent_imports: Option<u32>,
    pub translated_title: Option<String>,
    pub author: Option<String>,
    pub translated_author: Option<String>,
    pub cover_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub translated_tags: Option<Vec<String>>,
    pub synopsis: Option<String>,
    pub translated_synopsis: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ImportReport {
    pub already_exists: bool,
    pub is_overview: bool,
    pub novel_slug: String,
    pub chapter_id: Option<i64>,
    pub chapter_index: Option<i64>,
    pub translation_queued: bool,
}

#[derive(Clone, Debug)]
pub struct BatchItemReport {
    pub index: usize,
    pub chapter_title: String,
    pub result: Result<(String, i64, bool), String>,
}

pub struct ImportService {
    store: SqliteStore,
    gate: ImportGate,
}

impl ImportService {
    pub fn new(store: SqliteStore) -> Self {
        Self {
            store,
            gate: ImportGate::new(),
        }
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SqliteStore {
        &mut self.store
    }

    pub fn gate(&self) -> &ImportGate {
        &self.gate
    }

    /// Full import path: admission gate, novel resolution, atomic insert,
    /// translation enqueue. The permit is held for the duration of the
    /// storage work and released on return.
    pub fn import_chapter(
        &mut self,
        payload: ChapterImportPayload,
    ) -> Result<ImportReport, ServiceError> {
        let owner = parse_owner(&payload.owner)?;
        let max_concurrent = self.effective_concurrency(&owner, payload.max_concurrent_imports)?;
        let _permit = self
            .gate
            .try_acquire(&owner, max_concurrent)
            .ok_or(ServiceError::RateLimited { max_concurrent })?;
        self.import_admitted(&owner, payload)
    }

    /// Batch import: one admission permit covers the whole batch, items run
    /// sequentially and report individually, so one bad chapter never aborts
    /// the rest.
    pub fn import_batch(
        &mut self,
        owner: &str,
        chapters: Vec<ChapterImportPayload>,
        max_concurrent_imports: Option<u32>,
    ) -> Result<Vec<BatchItemReport>, ServiceError> {
        let owner = parse_owner(owner)?;
        let max_concurrent = self.effective_concurrency(&owner, max_concurrent_imports)?;
        let _permit = self
            .gate
            .try_acquire(&owner, max_concurrent)
            .ok_or(ServiceError::RateLimited { max_concurrent })?;

        let mut reports = Vec::with_capacity(chapters.len());
        for (index, payload) in chapters.into_iter().enumerate() {
            let chapter_title = payload
                .chapter_title
                .clone()
                .or_else(|| payload.original_title.clone())
                .unwrap_or_else(|| "Unknown".to_string());
            let result = match self.import_admitted(&owner, payload) {
                Ok(report) => Ok((
                    report.novel_slug,
                    report.chapter_index.unwrap_or(-1),
                    report.already_exists,
                )),
                Err(err) => Err(err.to_string()),
            };
            reports.push(BatchItemReport {
                index,
                chapter_title,
                result,
            });
        }
        Ok(reports)
    }

    fn effective_concurrency(
        &self,
        owner: &OwnerId,
        requested: Option<u32>,
    ) -> Result<u32, ServiceError> {
        let settings = self.store.settings_get(owner)?;
        let max = requested.unwrap_or(settings.max_concurrent_imports);
        Ok(max.clamp(MIN_CONCURRENT_IMPORTS, MAX_CONCURRENT_IMPORTS))
    }

    fn import_admitted(
        &mut self,
        owner: &OwnerId,
        payload: ChapterImportPayload,
    ) -> Result<ImportReport, ServiceError> {
        let source_url = payload
            .source_url
            .clone()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| payload.novel_source_url.clone());
        let novel_source_url = payload
            .novel_source_url
            .clone()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| source_url.clone());

        let content = payload
            .content
            .clone()
            .filter(|value| !value.trim().is_empty());

        // An overview page carries novel metadata but no chapter. Capture the
        // metadata and stop before the sequencer is involved.
        let overview = source_url
            .as_deref()
            .map(is_overview_url)
            .unwrap_or(false);
        if overview || (content.is_none() && payload.chapter_number.is_none()) {
            let novel = self.resolve_or_create_novel(owner, &payload, novel_source_url)?;
            return Ok(ImportReport {
                already_exists: false,
                is_overview: true,
                novel_slug: novel.slug,
                chapter_id: None,
                chapter_index: None,
                translation_queued: false,
            });
        }

        let Some(content) = content else {
            return Err(ServiceError::InvalidInput("no content provided".to_string()));
        };

        let novel = self.resolve_or_create_novel(owner, &payload, novel_source_url)?;
        let novel_slug = NovelSlug::try_new(novel.slug.clone())
            .map_err(|_| ServiceError::InvalidInput("stored novel slug is invalid".to_string()))?;

        let title = payload
            .chapter_title
            .clone()
            .or_else(|| payload.original_title.clone())
            .unwrap_or_else(|| "Untitled chapter".to_string());
        let translated_title = payload
            .translated_chapter_title
            .clone()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| payload.chapter_title.clone());

        let request = ChapterImportRequest {
            slug: chapter_slug(&novel.slug, &payload, source_url.as_deref()),
            title,
            translated_title,
            chapter_number: payload.chapter_number.clone(),
            content,
            images_json: payload
                .images
                .as_ref()
                .map(|images| images.to_string()),
            source_url,
            position: payload.position,
            is_special: payload.is_special.unwrap_or(false),
        };

        let outcome = self.store.chapter_import(owner, &novel_slug, request)?;

        let mut translation_queued = false;
        if !outcome.already_exists && payload.auto_translate.unwrap_or(false) {
            let enqueue = self.store.translation_enqueue(
                owner,
                TranslationEnqueueRequest {
                    chapter_id: outcome.chapter_id,
                    kind: TranslationJobKind::Full,
                    idempotency_key: format!("translate:{}:full", outcome.chapter_id),
                },
            )?;
            translation_queued = !enqueue.deduped;
        }

        Ok(ImportReport {
            already_exists: outcome.already_exists,
            is_overview: false,
            novel_slug: novel.slug,
            chapter_id: Some(outcome.chapter_id),
            chapter_index: Some(outcome.position),
            translation_queued,
        })
    }

    /// Finds the parent novel by title first (the most reliable key the
    /// scraper has), then by source URL, and creates it otherwise. Metadata
    /// carried by the payload is merged into an existing novel.
    fn resolve_or_create_novel(
        &mut self,
        owner: &OwnerId,
        payload: &ChapterImportPayload,
        novel_source_url: Option<String>,
    ) -> Result<NovelRow, ServiceError> {
        let mut existing = None;
        if let Some(title) = payload.original_title.as_deref() {
            existing = self.store.novel_find_by_title(owner, title)?;
        }
        if existing.is_none() {
            if let Some(url) = novel_source_url.as_deref() {
                existing = self.store.novel_find_by_source_url(owner, url)?;
            }
        }

        if let Some(novel) = existing {
            let update = metadata_update(payload);
            if update.is_empty() {
                return Ok(novel);
            }
            let slug = NovelSlug::try_new(novel.slug.clone()).map_err(|_| {
                ServiceError::InvalidInput("stored novel slug is invalid".to_string())
            })?;
            return Ok(self.store.novel_update(owner, &slug, update)?);
        }

        let title = payload
            .original_title
            .clone()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "Untitled novel".to_string());
        let slug = novel_slug_for(owner, &title, novel_source_url.as_deref());

        let request = NovelCreateRequest {
            slug: slug.clone(),
            title,
            translated_title: payload.translated_title.clone(),
            author: payload.author.clone(),
            translated_author: payload.translated_author.clone(),
            cover_url: payload.cover_url.clone(),
            tags: payload.tags.clone().unwrap_or_default(),
            translated_tags: payload.translated_tags.clone().unwrap_or_default(),
            synopsis: payload.synopsis.clone(),
            translated_synopsis: payload.translated_synopsis.clone(),
            glossary_json: None,
            source_url: novel_source_url,
        };

        match self.store.novel_create(owner, request) {
            Ok(row) => Ok(row),
            // Lost a create race with a concurrent import of the same novel.
            Err(StoreError::DuplicateSlug) => {
                let slug = NovelSlug::try_new(slug).map_err(|_| {
                    ServiceError::InvalidInput("generated novel slug is invalid".to_string())
                })?;
                self.store
                    .novel_get(owner, &slug)?
                    .ok_or(ServiceError::Store(StoreError::NovelNotFound))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Effective display order for a novel: its override, else the owner's
    /// default setting.
    pub fn effective_sort_order(
        &self,
        owner: &OwnerId,
        novel: &NovelRow,
    ) -> Result<SortOrder, ServiceError> {
        let settings = self.store.settings_get(owner)?;
        Ok(novel.effective_sort_order(settings.default_sort_order))
    }
}

fn parse_owner(raw: &str) -> Result<OwnerId, ServiceError> {
    OwnerId::try_new(raw).map_err(|_| ServiceError::InvalidInput("invalid owner".to_string()))
}

fn is_overview_url(url: &str) -> bool {
    url.contains("/novel/") && !url.contains("/viewer/")
}

fn metadata_update(payload: &ChapterImportPayload) -> NovelUpdateRequest {
    NovelUpdateRequest {
        title: None,
        translated_title: payload.translated_title.clone(),
        author: payload.author.clone(),
        translated_author: payload.translated_author.clone(),
        cover_url: payload.cover_url.clone(),
        tags: payload.tags.clone(),
        translated_tags: payload.translated_tags.clone(),
        synopsis: payload.synopsis.clone(),
        translated_synopsis: payload.translated_synopsis.clone(),
        glossary_json: None,
        source_url: None,
    }
}

fn novel_slug_for(owner: &OwnerId, title: &str, source_url: Option<&str>) -> String {
    let mut base = ns_core::ids::slugify(title);
    if base.chars().count() > 120 {
        base = base.chars().take(120).collect();
    }
    if base.is_empty() {
        base = format!("novel-{}", short_hash(source_url.unwrap_or(title)));
    }
    let owner_part = ns_core::ids::slugify(owner.as_str());
    if owner_part.is_empty() {
        base
    } else {
        format!("{base}_{owner_part}")
    }
}

fn chapter_slug(
    novel_slug: &str,
    payload: &ChapterImportPayload,
    source_url: Option<&str>,
) -> String {
    let number = payload
        .chapter_number
        .clone()
        .unwrap_or_else(|| "0".to_string());
    let number = ns_core::ids::slugify(&number);
    let number = if number.is_empty() {
        "0".to_string()
    } else {
        number
    };
    let seed = source_url
        .map(str::to_string)
        .or_else(|| payload.chapter_title.clone())
        .unwrap_or_else(|| format!("{novel_slug}-{number}"));
    format!("{novel_slug}_ch{number}_{}", short_hash(&seed))
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest
        .iter()
        .take(4)
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_urls_are_detected() {
        assert!(is_overview_url("https://example.com/novel/123"));
        assert!(!is_overview_url("https://example.com/viewer/123"));
        assert!(!is_overview_url("https://example.com/novel/123/viewer/9"));
    }

    #[test]
    fn novel_slug_prefers_title_and_falls_back_to_hash() {
        let owner = OwnerId::try_new("reader_01").expect("owner");
        let from_title = novel_slug_for(&owner, "Moonlit Regression", None);
        assert!(from_title.starts_with("moonlit-regression_"));

        let hashed = novel_slug_for(&owner, "!!!", Some("https://example.com/novel/9"));
        assert!(hashed.starts_with("novel-"));
        assert!(hashed.ends_with("_reader-01"));
    }

    #[test]
    fn chapter_slugs_are_deterministic_per_source() {
        let payload = ChapterImportPayload {
            chapter_number: Some("12".to_string()),
            ..Default::default()
        };
        let a = chapter_slug("moonrise", &payload, Some("https://example.com/viewer/12"));
        let b = chapter_slug("moonrise", &payload, Some("https://example.com/viewer/12"));
        let c = chapter_slug("moonrise", &payload, Some("https://example.com/viewer/13"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("moonrise_ch12_"));
    }
}
