//! Internal string helpers.

use std::borrow::Cow;

/// Escapes the five characters that are significant in HTML text and
/// attribute values.
pub(crate) fn escape_html(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }
    let mut escaped = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Splits a trailing `[digits]` help code off a description.
///
/// Returns the trimmed description and the digits, or `None` when the
/// description carries no such suffix. The code is kept as text, so it may be
/// any length.
pub(crate) fn split_help_code(description: &str) -> Option<(&str, &str)> {
    let inner = description.strip_suffix(']')?;
    let open = inner.rfind('[')?;
    let digits = &inner[open + 1..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((inner[..open].trim(), digits))
}
