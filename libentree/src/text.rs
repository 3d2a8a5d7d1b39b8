//! Helpers for turning CMS text fields into short plain-text snippets

/// The marker appended to text that was cut short by [excerpt]
pub const ELLIPSIS: char = '…';

/// Remove everything that looks like a markup tag (`<` up to the next `>`).
///
/// An unterminated `<` is kept as-is, which means that the output never
/// contains a complete tag and stripping it again is a no-op.
pub fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find('<') {
        match rest[start..].find('>') {
            Some(len) => {
                out.push_str(&rest[..start]);
                // tags separate words, e.g. `<p>one</p><p>two</p>`
                out.push(' ');
                rest = &rest[start + len + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Collapse every run of whitespace into a single space and trim both ends
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Produce a plain-text excerpt of rich text that is at most `cap` characters
/// long, ellipsis included.
///
/// Text that already fits is returned unchanged (after stripping), so
/// `excerpt(&excerpt(s, n), n) == excerpt(s, n)`.
pub fn excerpt(input: &str, cap: usize) -> String {
    let plain = collapse_whitespace(&strip_tags(input));
    if plain.chars().count() <= cap {
        return plain;
    }
    let mut cut: String = plain.chars().take(cap.saturating_sub(1)).collect();
    cut.truncate(cut.trim_end().len());
    cut.push(ELLIPSIS);
    cut
}

/// Shorten plain text to `cap` characters followed by `...`. Used for short
/// descriptions that are shown in full when they fit.
pub fn truncate(input: &str, cap: usize) -> String {
    match input.char_indices().nth(cap) {
        Some((idx, _)) => format!("{}...", &input[..idx]),
        None => input.to_string(),
    }
}

/// Split a newline-separated field into its non-empty, trimmed lines
pub fn lines(input: &str) -> Vec<&str> {
    input
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

/// Split an opening-hours entry like `Monday: 14:00 - 18:00` into the day and
/// the hours. Entries without a colon are returned as a label with no hours.
pub fn split_hours(line: &str) -> (&str, &str) {
    match line.split_once(':') {
        Some((day, hours)) => (day.trim(), hours.trim()),
        None => (line.trim(), ""),
    }
}

/// The url of an external website, if it is one that can be linked to.
/// Only `http` and `https` urls qualify.
pub fn web_url(input: &str) -> Option<&str> {
    let url = input.trim();
    let (scheme, rest) = url.split_once("://")?;
    let linkable = (scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https"))
        && !rest.is_empty()
        && !url.contains(char::is_whitespace);
    linkable.then_some(url)
}
