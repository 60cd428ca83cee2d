//! Result normalisation: raw model text → [`StructuredFinding`].
//!
//! ## Steps
//!
//! 1. Strip a Markdown code fence if the text starts with one.
//! 2. Parse as JSON. Failure is [`BriefingError::MalformedJson`].
//! 3. Strict tier: deserialise straight into [`StructuredFinding`].
//! 4. Lenient tier, only when the strict tier fails: require the four keys
//!    and coerce their values into shape. A missing key is
//!    [`BriefingError::MissingKeys`]; nothing else is rejected here.
//!
//! Diagnostics quote at most the first 500 characters of the text.

use crate::error::{preview, BriefingError};
use crate::finding::{StructuredFinding, REQUIRED_KEYS};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

static RE_FENCE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[A-Za-z0-9_-]*").unwrap());

/// Remove a surrounding Markdown code fence, if any.
///
/// With three or more lines the first and last lines are dropped. A shorter
/// fenced text has its fence markers (and any language tag) removed in place.
pub fn strip_code_fences(content: &str) -> String {
    let content = content.trim();
    if !content.starts_with("```") {
        return content.to_string();
    }

    let lines: Vec<&str> = content.split('\n').collect();
    if lines.len() > 2 {
        lines[1..lines.len() - 1].join("\n").trim().to_string()
    } else {
        RE_FENCE_MARKER.replace_all(content, "").trim().to_string()
    }
}

/// Turn the raw response text into a validated finding.
pub fn normalize(raw: &str) -> Result<StructuredFinding, BriefingError> {
    let content = strip_code_fences(raw);

    let value: Value = serde_json::from_str(&content).map_err(|e| BriefingError::MalformedJson {
        detail: e.to_string(),
        preview: preview(&content),
    })?;

    match StructuredFinding::deserialize(&value) {
        Ok(finding) => {
            debug!("Response passed strict validation");
            Ok(finding)
        }
        Err(e) => {
            warn!("Strict validation failed ({}); applying lenient validation", e);
            lenient(&value, &content)
        }
    }
}

fn lenient(value: &Value, content: &str) -> Result<StructuredFinding, BriefingError> {
    let empty = Map::new();
    let object = value.as_object().unwrap_or(&empty);

    let missing: Vec<String> = REQUIRED_KEYS
        .iter()
        .filter(|key| !object.contains_key(**key))
        .map(|key| key.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(BriefingError::MissingKeys {
            missing,
            preview: preview(content),
        });
    }

    Ok(StructuredFinding {
        summary: scalar_text(&object["summary"]),
        risk_points: text_list(&object["risk_points"]),
        attract_points: text_list(&object["attract_points"]),
        notes_for_interviewer: text_list(&object["notes_for_interviewer"]),
    })
}

/// Text of a single value: strings as-is, `null` empty, anything else as JSON.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A list position: arrays map element-wise, `null` is empty, a lone value
/// becomes a one-element list.
fn text_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(scalar_text).collect(),
        Value::Null => Vec::new(),
        other => vec![scalar_text(other)],
    }
}
