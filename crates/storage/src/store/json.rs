#![forbid(unsafe_code)]

use super::StoreError;

pub(crate) fn encode_string_list(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

pub(crate) fn decode_string_list(raw: Option<String>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    serde_json::from_str::<Vec<String>>(&raw).unwrap_or_default()
}

/// Normalizes an optional raw JSON column value: empty input becomes `None`,
/// anything else must parse so the store never holds unreadable JSON.
pub(crate) fn validate_json_column(
    raw: Option<String>,
    field: &'static str,
) -> Result<Option<String>, StoreError> {
    match raw {
        None => Ok(None),
        Some(raw) => {
            let raw = raw.trim().to_string();
            if raw.is_empty() {
                return Ok(None);
            }
            serde_json::from_str::<serde_json::Value>(&raw)
                .map_err(|_| StoreError::InvalidInput(field))?;
            Ok(Some(raw))
        }
    }
}
