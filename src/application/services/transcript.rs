use std::sync::LazyLock;

use regex::Regex;

static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[A-Za-z0-9_-]*\s*$").unwrap());

/// Join per-segment transcripts with a blank line, preserving segment
/// order. Segments are contiguous time slices, so reordering would
/// scramble the transcript.
pub fn assemble_raw_transcript(fragments: &[String]) -> String {
    fragments.join("\n\n")
}

/// Remove enclosing code fences a model may have wrapped its output in.
///
/// Strips repeatedly until a fixpoint, so the result of applying it twice
/// equals applying it once. Text that does not start with a fence marker is
/// returned trimmed and otherwise unchanged.
pub fn strip_code_fences(input: &str) -> String {
    let mut current = input.trim().to_string();
    loop {
        let next = strip_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_once(s: &str) -> String {
    if !s.starts_with("```") {
        return s.to_string();
    }
    let Some(first_newline) = s.find('\n') else {
        return s.to_string();
    };
    if !OPENING_FENCE.is_match(&s[..first_newline]) {
        return s.to_string();
    }

    let mut body = &s[first_newline + 1..];
    if let Some(last_fence) = body.rfind("```") {
        if body[last_fence..].trim() == "```" {
            body = &body[..last_fence];
        }
    }
    body.trim().to_string()
}
