// src/utils/seo.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<h[1-3][^>]*>.*?</h[1-3]>").expect("valid heading regex"));

/// Advisory SEO flags for one language variant.
/// None of these block saving a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeoChecks {
    /// Title length is strictly between 10 and 70 characters.
    pub has_title: bool,
    /// Raw rich-text payload is longer than 300 characters.
    pub has_content: bool,
    /// Excerpt fits the 120-160 character meta-description window.
    pub has_meta_description: bool,
    /// Content contains at least one h1-h3 heading element.
    pub has_headings: bool,
}

/// Evaluates the length/content heuristics for a single language variant.
///
/// Lengths are counted in characters on the raw HTML payload. Each language
/// variant is checked independently; fields are never mixed across languages.
pub fn check(title: &str, excerpt: &str, content: &str) -> SeoChecks {
    let title_len = title.chars().count();
    let excerpt_len = excerpt.chars().count();

    SeoChecks {
        has_title: title_len > 10 && title_len < 70,
        has_content: content.chars().count() > 300,
        has_meta_description: (120..=160).contains(&excerpt_len),
        has_headings: HEADING_RE.is_match(content),
    }
}
