#![forbid(unsafe_code)]

/// Owner of a shelf of novels. Every stored row is scoped by one of these.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, OwnerIdError> {
        let value = value.into();
        validate_owner_id(&value)?;
        Ok(Self(value))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OwnerIdError {
    Empty,
    TooLong,
    InvalidFirstChar,
    InvalidChar { ch: char, index: usize },
}

fn validate_owner_id(value: &str) -> Result<(), OwnerIdError> {
    if value.is_empty() {
        return Err(OwnerIdError::Empty);
    }
    if value.len() > 128 {
        return Err(OwnerIdError::TooLong);
    }
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return Err(OwnerIdError::Empty);
    };
    if !first.is_ascii_alphanumeric() {
        return Err(OwnerIdError::InvalidFirstChar);
    }
    for (index, ch) in value.chars().enumerate() {
        if index == 0 {
            continue;
        }
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '/' | '-') {
            continue;
        }
        return Err(OwnerIdError::InvalidChar { ch, index });
    }
    Ok(())
}

/// Novel slug, unique per owner. Slugs generated from source-language titles
/// may carry non-ASCII letters, so validation is structural only: no
/// whitespace, no path separators, bounded length.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NovelSlug(String);

impl NovelSlug {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, NovelSlugError> {
        let value = value.into();
        validate_novel_slug(&value)?;
        Ok(Self(value))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NovelSlugError {
    Empty,
    TooLong,
    InvalidChar { ch: char, index: usize },
}

fn validate_novel_slug(value: &str) -> Result<(), NovelSlugError> {
    if value.is_empty() {
        return Err(NovelSlugError::Empty);
    }
    if value.chars().count() > 255 {
        return Err(NovelSlugError::TooLong);
    }
    for (index, ch) in value.chars().enumerate() {
        if ch.is_whitespace() || matches!(ch, '/' | '\\') {
            return Err(NovelSlugError::InvalidChar { ch, index });
        }
    }
    Ok(())
}

/// Lowercases, keeps letters and digits, collapses everything else into
/// single dashes. Returns an empty string when nothing survives (callers
/// fall back to a hash-derived slug).
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_dash = false;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
        } else {
            pending_dash = true;
        }
    }
    out
}
