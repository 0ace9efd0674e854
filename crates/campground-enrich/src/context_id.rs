/// Clean a raw record identifier into a booking-system context id.
///
/// Surrounding whitespace is trimmed and a single pair of enclosing braces is removed, so
/// `"  {ABC123}  "` becomes `"ABC123"`. Empty input, or input that is empty once cleaned,
/// yields `None`.
pub fn extract_context_id(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();

    // One pair only, "{{X}}" keeps its inner braces
    let unbraced = trimmed
        .strip_prefix('{')
        .and_then(|inner| inner.strip_suffix('}'))
        .unwrap_or(trimmed);

    let cleaned = unbraced.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}
