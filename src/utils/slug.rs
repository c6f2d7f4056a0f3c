// src/utils/slug.rs

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Derives a URL-safe slug from arbitrary Unicode text.
///
/// Lowercases the input, applies canonical decomposition (NFD) and strips
/// combining marks so accented Vietnamese letters fold to their base Latin
/// letters, drops everything that is not an ASCII letter, digit, whitespace
/// or hyphen, then joins words with single hyphens.
///
/// Empty or whitespace-only input yields an empty string. Callers must treat
/// an empty slug as "not yet generated" and never overwrite a user-provided
/// slug with it. Uniqueness is not checked here; the database surfaces slug
/// conflicts per language.
pub fn slugify(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();

    let joined = folded.split_whitespace().collect::<Vec<_>>().join("-");
    joined.trim_matches('-').to_string()
}
