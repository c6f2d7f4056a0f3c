/// Sanitizes post rich-text content using the ammonia library.
///
/// Whitelist-based cleaning: safe markup (paragraphs, headings, emphasis,
/// links, images) is preserved while dangerous tags (<script>, <iframe>) and
/// event-handler attributes are stripped. Applied to both language variants
/// of a post's content before storage, as a fail-safe against stored XSS in
/// the public blog and the admin preview.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
