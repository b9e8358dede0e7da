/// Truncate to at most `max_chars` characters, ending with "..." when shortened
///
/// Limits too small to hold the suffix get a plain cut.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    const SUFFIX: &str = "...";

    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars <= SUFFIX.len() {
        return text.chars().take(max_chars).collect();
    }

    let keep = max_chars.saturating_sub(SUFFIX.len());
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(SUFFIX);
    truncated
}

/// First non-blank line, trimmed
pub fn first_line(text: &str) -> &str {
    text.lines().map(str::trim).find(|line| !line.is_empty()).unwrap_or("")
}
