use std::path::Path;

const MAX_DISPLAY_LEN: usize = 32;

/// Derive a presentation name from an uploaded filename: the file stem with
/// whitespace collapsed, truncated to 32 characters with an ellipsis.
pub fn display_name_from_filename(filename: &str) -> String {
    if filename.is_empty() {
        return String::new();
    }

    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(filename);

    let mut collapsed = String::with_capacity(stem.len());
    let mut prev_was_space = false;
    for ch in stem.trim().chars() {
        if ch.is_whitespace() {
            if !prev_was_space {
                collapsed.push(' ');
                prev_was_space = true;
            }
        } else {
            collapsed.push(ch);
            prev_was_space = false;
        }
    }

    if collapsed.chars().count() <= MAX_DISPLAY_LEN {
        return collapsed;
    }

    let mut truncated: String = collapsed.chars().take(MAX_DISPLAY_LEN - 1).collect();
    truncated.push('…');
    truncated
}
