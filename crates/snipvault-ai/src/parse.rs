//! Defensive parsing of model replies.
//!
//! Model output is untrusted: replies wrap JSON in markdown fences, prepend
//! prose, or return something that is not JSON at all. Extraction runs a
//! fixed ladder of strategies and the caller falls back to deterministic
//! defaults when every rung fails.

use serde_json::Value;

use snipvault_core::{Error, Result};

/// Extract a JSON value from a raw model reply.
///
/// Strategies, in order:
/// 1. parse the whole reply as JSON
/// 2. parse the body of the first fenced code block
/// 3. parse the first balanced `{...}` object
/// 4. parse the first balanced `[...]` array
pub fn extract_json(raw: &str) -> Result<Value> {
    let trimmed = raw.trim();

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    if let Some(body) = fenced_block(trimmed) {
        if let Ok(value) = serde_json::from_str(body.trim()) {
            return Ok(value);
        }
    }

    if let Some(body) = balanced_span(trimmed, '{', '}') {
        if let Ok(value) = serde_json::from_str(body) {
            return Ok(value);
        }
    }

    if let Some(body) = balanced_span(trimmed, '[', ']') {
        if let Ok(value) = serde_json::from_str(body) {
            return Ok(value);
        }
    }

    Err(Error::Serialization(format!(
        "No parseable JSON in model reply ({} bytes)",
        raw.len()
    )))
}

/// Extract and deserialize into a concrete type in one step.
pub fn extract_typed<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T> {
    let value = extract_json(raw)?;
    serde_json::from_value(value).map_err(Error::from)
}

/// The body of the first ``` fenced block, if any. An info string on the
/// opening fence (```json) is skipped.
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = &text[open + 3..];
    let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_fence[body_start..];
    let close = body.find("```")?;
    Some(&body[..close])
}

/// The first balanced span delimited by `open`/`close`, honoring JSON
/// string literals and escapes.
fn balanced_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split a comma-separated tag reply into normalized tag names.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().trim_matches(|c| c == '"' || c == '\'').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}
