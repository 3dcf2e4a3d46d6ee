#![forbid(unsafe_code)]

/// Rank assigned to chapters whose number is absent, unparsable, or the
/// "BONUS" marker. Such chapters sort after every numbered chapter.
pub const SPECIAL_CHAPTER_RANK: f64 = 999_999.0;

/// Extracts the upstream episode identifier from a chapter source URL.
///
/// The scraping agent emits viewer URLs of the form
/// `https://<host>/viewer/<digits>`; the digits are the upstream
/// chronological sequence. Any other URL shape yields `None`.
pub fn ordering_key_from_url(source_url: &str) -> Option<i64> {
    let (_, rest) = source_url.split_once("/viewer/")?;
    let end = rest
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map(|(index, _)| index)
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    rest[..end].parse::<i64>().ok()
}

/// Numeric rank of a free-text chapter number, used as the tie-break when no
/// ordering key can be derived from the source URL.
pub fn chapter_rank(chapter_number: Option<&str>) -> f64 {
    let Some(raw) = chapter_number else {
        return SPECIAL_CHAPTER_RANK;
    };
    let raw = raw.trim();
    if raw.is_empty() || raw == "BONUS" {
        return SPECIAL_CHAPTER_RANK;
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => SPECIAL_CHAPTER_RANK,
    }
}

/// Ordering facts of one chapter, detached from its stored row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SiblingOrder {
    pub ordering_key: Option<i64>,
    pub chapter_rank: f64,
}

impl SiblingOrder {
    pub fn derive(source_url: Option<&str>, chapter_number: Option<&str>) -> Self {
        Self {
            ordering_key: source_url.and_then(ordering_key_from_url),
            chapter_rank: chapter_rank(chapter_number),
        }
    }
}

/// Computes where a new chapter belongs among `existing`, which must be
/// ascending by stored position. Returns an index in `0..=existing.len()`.
///
/// With an ordering key, the new chapter lands before the first sibling whose
/// own key is strictly greater; siblings without a key do not participate in
/// the comparison. Ties therefore insert before the first equal-or-greater
/// key, keeping previously imported duplicates in their relative order.
/// Without a key the chapter-number rank is compared the same way.
pub fn insertion_index(existing: &[SiblingOrder], new: &SiblingOrder) -> usize {
    if let Some(new_key) = new.ordering_key {
        for (index, sibling) in existing.iter().enumerate() {
            let Some(existing_key) = sibling.ordering_key else {
                continue;
            };
            if existing_key > new_key {
                return index;
            }
        }
        return existing.len();
    }

    for (index, sibling) in existing.iter().enumerate() {
        if sibling.chapter_rank > new.chapter_rank {
            return index;
        }
    }
    existing.len()
}

/// Display direction for a novel's chapter list. Storage order is always
/// ascending by position; this only affects presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Ascending),
            "desc" => Some(Self::Descending),
            _ => None,
        }
    }
}

/// Reorders rows already sorted ascending by position into display order.
/// Pure: never touches stored positions.
pub fn display_order<T>(mut rows: Vec<T>, order: SortOrder) -> Vec<T> {
    if order == SortOrder::Descending {
        rows.reverse();
    }
    rows
}

/// Maps a display index back to the storage (ascending) index it refers to.
/// Every operation that addresses a chapter "by index" must resolve through
/// this, or it will target the wrong row whenever the display order is
/// descending.
pub fn display_to_storage_index(
    len: usize,
    display_index: usize,
    order: SortOrder,
) -> Option<usize> {
    if display_index >= len {
        return None;
    }
    Some(match order {
        SortOrder::Ascending => display_index,
        SortOrder::Descending => len - 1 - display_index,
    })
}
