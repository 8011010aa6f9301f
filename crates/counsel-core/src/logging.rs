//! Log formatting helpers

use std::borrow::Cow;

/// Truncate `s` to at most `max` bytes for logging, backing off to the
/// nearest char boundary so multibyte text never splits mid-character.
/// Appends an ellipsis when text was dropped.
pub fn preview(s: &str, max: usize) -> Cow<'_, str> {
    if s.len() <= max {
        return Cow::Borrowed(s);
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    Cow::Owned(format!("{}...", &s[..end]))
}
