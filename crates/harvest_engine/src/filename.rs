/// Deterministic artifact name for batch `index`: `{prefix}_batch_{index}.json`,
/// or `batch_{index}.json` when the prefix sanitizes to nothing.
pub fn batch_filename(prefix: &str, index: usize) -> String {
    let sanitized = sanitize_prefix(prefix);
    if sanitized.is_empty() {
        format!("batch_{index}.json")
    } else {
        format!("{sanitized}_batch_{index}.json")
    }
}

fn sanitize_prefix(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    // Collapse multiple underscores
    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }
    let mut final_name = compacted.trim_matches(&['_', '.'][..]).to_string();
    if final_name.chars().count() > 64 {
        final_name = final_name.chars().take(64).collect();
    }
    final_name
}

fn is_forbidden(c: char) -> bool {
    c.is_whitespace()
        || matches!(c,
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
        )
}
