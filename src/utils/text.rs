/// Truncates a string to at most `max` characters.
///
/// Operates on characters rather than bytes so multi-byte Vietnamese text is
/// never split inside a code point. Used for the 60-character meta title and
/// 160-character meta description fallbacks.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
