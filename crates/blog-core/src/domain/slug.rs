//! Slug helpers used by the prepopulated slug field and post validation.

use super::SLUG_MAX_LENGTH;

/// Build a URL-safe slug from free text.
///
/// Non-ASCII characters are dropped, the rest is lowercased, punctuation is
/// removed and runs of whitespace or hyphens collapse to a single hyphen.
/// The result is truncated to [`SLUG_MAX_LENGTH`].
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars().filter(char::is_ascii) {
        if c.is_ascii_whitespace() || c == '-' {
            pending_hyphen = true;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        }
    }

    let trimmed = slug.trim_matches(|c: char| c == '-' || c == '_');
    let truncated: String = trimmed.chars().take(SLUG_MAX_LENGTH).collect();
    truncated.trim_end_matches(|c: char| c == '-' || c == '_').to_string()
}

/// A slug consists of ASCII letters, digits, underscores and hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
