/// Marker appended to text cut by [`shorten`].
pub const ELLIPSIS: &str = "..";

/// Shorten `text` to at most `max_len` characters.
///
/// Text of `max_len` characters or fewer is returned unchanged. Longer text
/// keeps its first `max_len - 2` characters followed by [`ELLIPSIS`], so the
/// result is exactly `max_len` characters long. Lengths are counted in
/// `char`s, never bytes, so multi-byte text is never split mid-character.
/// A `max_len` below the marker length yields the marker alone.
pub fn shorten(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let keep = max_len.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Trim and collapse every run of whitespace (newlines included) into a single space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reduce an abstract-page URL such as `http://arxiv.org/abs/1705.00001v1`
/// to the bare identifier. Anything else is returned trimmed.
pub fn strip_id_prefix(raw: &str) -> String {
    const PREFIXES: &[&str] = &["http://arxiv.org/abs/", "https://arxiv.org/abs/"];
    let raw = raw.trim();
    PREFIXES
        .iter()
        .find_map(|prefix| raw.strip_prefix(prefix))
        .unwrap_or(raw)
        .to_string()
}
