//! Shared text helpers.

/// Title used when a proposal has no description.
pub const UNTITLED: &str = "Untitled Proposal";

const TITLE_MAX_CHARS: usize = 100;

/// First `max_chars` characters of `s`, never splitting a UTF-8 character.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Proposal title from the first line of a markdown description.
///
/// Leading `#` heading markers are stripped. Titles longer than 100
/// characters are cut to 97 and suffixed with `...`.
///
/// ```
/// use proposal_domain::util::markdown_title;
///
/// assert_eq!(markdown_title("## Fund the grants program\nBody"), "Fund the grants program");
/// assert_eq!(markdown_title(""), "Untitled Proposal");
/// ```
pub fn markdown_title(description: &str) -> String {
    if description.is_empty() {
        return UNTITLED.to_string();
    }
    let first_line = description.split('\n').next().unwrap_or_default();
    let title = first_line.trim_start_matches('#').trim();

    if title.chars().count() > TITLE_MAX_CHARS {
        format!("{}...", truncate_chars(title, TITLE_MAX_CHARS - 3))
    } else {
        title.to_string()
    }
}
