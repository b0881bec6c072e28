//! Output parsers applied to raw model text.
//!
//! A parse failure is a pipeline failure, so the fallback chain moves on to
//! the next backend when one of these returns an error.
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Trimmed model text; blank output is rejected.
pub fn parse_string(raw: &str) -> AppResult<String> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(AppError::OutputParse("model returned empty output".into()));
    }
    Ok(text.to_string())
}

/// Body of the first markdown code fence anywhere in `raw`, or the whole text
/// when there is none. An unclosed fence runs to the end of the text.
pub fn extract_json_block(raw: &str) -> &str {
    let Some(open) = raw.find("```") else {
        return raw.trim();
    };
    let after = &raw[open + 3..];
    let body = match after.find('\n') {
        Some(newline) => &after[newline + 1..],
        // one-line fence, or the language tag is still arriving
        None => after.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    let body = match body.find("```") {
        Some(close) => &body[..close],
        None => body,
    };
    body.trim()
}

pub fn parse_json(raw: &str) -> AppResult<Value> {
    serde_json::from_str(extract_json_block(raw))
        .map_err(|e| AppError::OutputParse(format!("invalid JSON output: {}", e)))
}

/// Best-effort parse of a JSON document that may be cut off mid-way.
///
/// Open strings, arrays and objects are closed; if that still does not parse,
/// characters are dropped from the end until it does.
pub fn parse_partial_json(text: &str) -> Option<Value> {
    let text = extract_json_block(text);
    if text.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }
    // only objects and arrays can be repaired
    if !text.starts_with(['{', '[']) {
        return None;
    }
    let mut end = text.len();
    while end > 0 {
        if let Ok(value) = serde_json::from_str(&close_open_json(&text[..end])) {
            return Some(value);
        }
        end -= 1;
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
    }
    None
}

fn close_open_json(prefix: &str) -> String {
    let mut closers = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    for c in prefix.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => closers.push('}'),
            '[' => closers.push(']'),
            '}' | ']' => {
                closers.pop();
            }
            _ => {}
        }
    }

    let mut out = prefix.to_string();
    if in_string {
        if escaped {
            out.pop();
        }
        out.push('"');
    }
    out.extend(closers.into_iter().rev());
    out
}

/// Incremental JSON parser for streamed model output.
#[derive(Debug, Default)]
pub struct JsonStreamParser {
    buffer: String,
    last: Option<Value>,
}

impl JsonStreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk; returns the current partial value when it differs
    /// from the one returned previously.
    pub fn push(&mut self, chunk: &str) -> Option<Value> {
        self.buffer.push_str(chunk);
        let value = parse_partial_json(&self.buffer)?;
        if self.last.as_ref() == Some(&value) {
            return None;
        }
        self.last = Some(value.clone());
        Some(value)
    }

    /// The complete document; fails if the accumulated text is not valid JSON.
    pub fn finish(self) -> AppResult<Value> {
        parse_json(&self.buffer)
    }
}
