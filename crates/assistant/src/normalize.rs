/// Lowercase and trim a raw chat message.
///
/// Trimming also drops the ASCII information separators U+001C..=U+001F, which
/// `char::is_whitespace` keeps.
///
/// Every matching step (rules and fallback scoring) works on this form, and it is also what the
/// context store remembers for the user.
#[must_use]
pub fn normalize(message: &str) -> String {
    message
        .to_lowercase()
        .trim_matches(is_blank)
        .to_string()
}

fn is_blank(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}
