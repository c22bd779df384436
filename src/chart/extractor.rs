//! Chart payload extraction from assistant text
//!
//! Assistant answers are prose with an optional JSON chart description
//! embedded in them. The preferred form is a fenced ```` ```json ```` block;
//! answers that forget the fence are handled by scanning for a balanced
//! `{ ... }` span that mentions `"chart_type"`.
//!
//! Extraction never fails: a malformed payload is logged and dropped, and the
//! prose is still returned.

use super::ChartPayload;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::sync::OnceLock;

/// Result of splitting an assistant answer into prose and chart payload
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Human-readable text with the JSON removed
    pub text: String,
    /// Chart payload, when one was found and decoded
    pub payload: Option<ChartPayload>,
}

/// A JSON candidate located inside the raw text
struct Candidate<'a> {
    json: &'a str,
    start: usize,
    end: usize,
}

fn fenced_json_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("valid fenced json regex"))
}

fn blank_run_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("valid blank line regex"))
}

/// Split raw assistant text into display text and an optional chart payload
///
/// # Arguments
///
/// * `raw` - Unstructured answer returned by the AI gateway
///
/// # Returns
///
/// The cleaned text and the decoded payload, if any. When the payload carries
/// a `response_text`, it is placed before the remaining prose.
///
/// # Examples
///
/// ```
/// use ecoinsight::chart::extract;
///
/// let raw = "Emissions fell.\n```json\n{\"chart_type\":\"snapshot\",\"chart_data\":[{\"label\":\"Energy\",\"value\":10,\"color\":\"#f00\"}]}\n```";
/// let extraction = extract(raw);
/// assert_eq!(extraction.text, "Emissions fell.");
/// assert!(extraction.payload.is_some());
/// ```
pub fn extract(raw: &str) -> Extraction {
    let Some(candidate) = find_fenced(raw).or_else(|| find_balanced(raw)) else {
        return Extraction {
            text: raw.trim().to_string(),
            payload: None,
        };
    };

    let prefix = &raw[..candidate.start];
    let suffix = &raw[candidate.end..];

    let parsed: JsonValue = match serde_json::from_str(candidate.json) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Failed to parse extracted chart JSON: {}", e);
            return Extraction {
                text: collapse_blank_lines(&format!("{}{}", prefix, suffix)),
                payload: None,
            };
        }
    };

    let response_text = parsed
        .get("response_text")
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let prose = match response_text {
        Some(lead) => {
            let remainder = format!("{}{}", drop_lead_in(prefix), suffix);
            format!("{}\n\n{}", lead, remainder.trim())
        }
        None => format!("{}{}", prefix, suffix),
    };

    Extraction {
        text: collapse_blank_lines(&prose),
        payload: decode_payload(&parsed),
    }
}

/// Locate the first fenced ```` ```json ```` block
fn find_fenced(raw: &str) -> Option<Candidate<'_>> {
    let captures = fenced_json_regex().captures(raw)?;
    let whole = captures.get(0)?;
    let inner = captures.get(1)?;
    Some(Candidate {
        json: inner.as_str().trim(),
        start: whole.start(),
        end: whole.end(),
    })
}

const CHART_TYPE_KEY: &str = "\"chart_type\"";

/// Locate the earliest-starting balanced `{ ... }` span that mentions `"chart_type"`
///
/// Single forward pass: open braces are kept on a stack and string/escape
/// state is tracked while inside a brace, so braces in JSON strings are
/// ignored. Unmatched `{` stay on the stack and never form a span.
fn find_balanced(raw: &str) -> Option<Candidate<'_>> {
    let keys: Vec<usize> = raw.match_indices(CHART_TYPE_KEY).map(|(at, _)| at).collect();
    if keys.is_empty() {
        return None;
    }

    let bytes = raw.as_bytes();
    let mut open: Vec<usize> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut best: Option<(usize, usize)> = None;

    for (index, &byte) in bytes.iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' if !open.is_empty() => in_string = true,
            b'{' => open.push(index),
            b'}' => {
                let Some(start) = open.pop() else {
                    continue;
                };
                let end = index + 1;
                let earlier = best.map_or(true, |(best_start, _)| start < best_start);
                if earlier && span_has_key(&keys, start, end) {
                    best = Some((start, end));
                }
            }
            _ => {}
        }
    }

    best.map(|(start, end)| Candidate {
        json: &raw[start..end],
        start,
        end,
    })
}

/// Whether a key occurrence lies entirely within `start..end`
fn span_has_key(keys: &[usize], start: usize, end: usize) -> bool {
    let first = keys.partition_point(|&at| at < start);
    keys.get(first)
        .is_some_and(|&at| at + CHART_TYPE_KEY.len() <= end)
}

/// Drop a trailing "Here is the chart:" style line that introduced the payload
fn drop_lead_in(prefix: &str) -> &str {
    let trimmed = prefix.trim_end();
    if !trimmed.ends_with(':') {
        return prefix;
    }
    match trimmed.rfind('\n') {
        Some(newline) => &trimmed[..newline],
        None => "",
    }
}

/// Map a parsed JSON document onto a chart payload, if it carries chart data
fn decode_payload(parsed: &JsonValue) -> Option<ChartPayload> {
    let chart_source = if parsed.get("chart_data").is_some() {
        parsed
    } else {
        parsed.get("data")?
    };

    match ChartPayload::from_value(chart_source) {
        Ok(payload) => Some(payload),
        Err(e) => {
            tracing::warn!("Ignoring chart payload with unexpected shape: {}", e);
            None
        }
    }
}

fn collapse_blank_lines(text: &str) -> String {
    blank_run_regex()
        .replace_all(text, "\n\n")
        .trim()
        .to_string()
}
