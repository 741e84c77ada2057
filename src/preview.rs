use serde_json::Value;

const TRUNCATED_MARKER: &str = "...";
pub const MAX_PREVIEW_CHARS: usize = 500;

/// Pretty-print `data` and cut it down to the first [`MAX_PREVIEW_CHARS`]
/// characters, marking the cut with an ellipsis.
pub fn render_preview(data: &Value) -> String {
    // Serializing a `Value` cannot fail: every map key is already a string.
    let pretty = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
    truncate_preview(&pretty, MAX_PREVIEW_CHARS)
}

pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}{TRUNCATED_MARKER}", &text[..end]),
        None => text.to_string(),
    }
}
