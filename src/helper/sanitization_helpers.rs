use std::collections::HashSet;

/// Escapes every HTML tag in member-written text (post bodies, comments).
/// Existing entities are decoded first so text is never escaped twice.
pub fn sanitize_member_text(input: &str) -> String {
    let decoded = html_escape::decode_html_entities(input);
    html_escape::encode_text(&decoded).to_string()
}

/// Strips all HTML tags, leaving plain text (titles, usernames, quotes).
pub fn strip_all_html(input: &str) -> String {
    let cleaned = ammonia::Builder::new()
        .tags(HashSet::new())
        .clean(input)
        .to_string();
    html_escape::decode_html_entities(&cleaned).trim().to_string()
}

/// Trims an optional field; blank input becomes `None`.
pub fn clean_optional(input: Option<&str>) -> Option<String> {
    input
        .map(strip_all_html)
        .filter(|value| !value.is_empty())
}
