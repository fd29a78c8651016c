//! Slug generation for section and indicator links.
//!
//! Slugs are ASCII-only: accented characters are NFKD-decomposed and their
//! combining marks dropped, so Swedish sheet names fold cleanly
//! (`Förtroende 1` -> `fortroende-1`).

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Derive a lowercase, hyphen-separated ASCII slug from arbitrary text.
///
/// The result contains only `[a-z0-9-]`, never starts or ends with a
/// hyphen, and falls back to `section` when nothing survives folding.
pub fn slugify(value: &str) -> String {
    let folded: String = value
        .trim()
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    let mut slug = String::with_capacity(folded.len());
    let mut pending_hyphen = false;
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}
