//! Provider output parsing and per-mode validation.
//!
//! A provider reply is only usable when it is a JSON object, carries the
//! field its mode is contracted to fill, and that field is not empty.
//! Anything else is an [`OutputError`] and sends the call to the heuristics.

use scribbly_core::assistant::{AssistantRequest, AssistantResult, Mode, Vibe};
use serde::Deserialize;
use thiserror::Error;

use crate::heuristic::neutral_vibe;

/// Why a provider reply was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutputError {
    #[error("reply is not a JSON object: {0}")]
    NotJson(String),

    #[error("reply is missing the \"{0}\" field")]
    MissingField(&'static str),

    #[error("reply has an empty \"{0}\" field")]
    Incomplete(&'static str),
}

#[derive(Debug, Default, Deserialize)]
struct RawOutput {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    suggestions: Option<Vec<String>>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    translated_content: Option<String>,
    #[serde(default)]
    vibe: Option<RawVibe>,
}

#[derive(Debug, Deserialize)]
struct RawVibe {
    #[serde(default)]
    label: String,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    emoji: String,
    #[serde(default)]
    color: String,
}

/// Remove a surrounding Markdown code fence, if any.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_list(values: Vec<String>, limit: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        let value = value.trim();
        if !value.is_empty() && !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
        if out.len() == limit {
            break;
        }
    }
    out
}

/// Parse and validate a provider reply for `request`.
///
/// `content` is the trimmed request content, used to default the `vibe`
/// summary when the provider left it out.
pub fn parse_output(
    raw: &str,
    request: &AssistantRequest,
    content: &str,
) -> Result<AssistantResult, OutputError> {
    let value: serde_json::Value = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| OutputError::NotJson(e.to_string()))?;

    let object = value
        .as_object()
        .ok_or_else(|| OutputError::NotJson("top-level value is not an object".into()))?;

    let field = request.mode.output_field();
    if object.get(field).is_none_or(serde_json::Value::is_null) {
        return Err(OutputError::MissingField(field));
    }

    let raw: RawOutput =
        serde_json::from_value(value).map_err(|e| OutputError::NotJson(e.to_string()))?;

    let keep_tags = request.include_tags || request.mode == Mode::Tags;
    let tags = if keep_tags {
        clean_list(raw.tags.unwrap_or_default(), usize::MAX)
    } else {
        Vec::new()
    };
    let suggestions = clean_list(
        raw.suggestions.unwrap_or_default(),
        AssistantResult::MAX_SUGGESTIONS,
    );

    let result = match request.mode {
        Mode::Summary | Mode::Polish | Mode::Emojify => AssistantResult {
            summary: Some(non_blank(raw.summary).ok_or(OutputError::Incomplete(field))?),
            tags,
            ..AssistantResult::ok()
        },
        Mode::Title => {
            if suggestions.is_empty() {
                return Err(OutputError::Incomplete(field));
            }
            AssistantResult {
                suggestions,
                tags,
                ..AssistantResult::ok()
            }
        }
        Mode::Reply => AssistantResult {
            suggestions,
            ..AssistantResult::ok()
        },
        Mode::Tags => AssistantResult {
            tags,
            ..AssistantResult::ok()
        },
        Mode::Translate => AssistantResult {
            translated_content: Some(
                non_blank(raw.translated_content).ok_or(OutputError::Incomplete(field))?,
            ),
            tags,
            ..AssistantResult::ok()
        },
        Mode::Vibe => {
            let vibe = raw.vibe.ok_or(OutputError::MissingField(field))?;
            AssistantResult {
                summary: Some(non_blank(raw.summary).unwrap_or_else(|| content.to_string())),
                vibe: Some(normalize_vibe(vibe).ok_or(OutputError::Incomplete(field))?),
                tags,
                ..AssistantResult::ok()
            }
        }
    };

    Ok(result)
}

/// Clamp the score and fill presentation defaults; `None` if unlabeled.
fn normalize_vibe(raw: RawVibe) -> Option<Vibe> {
    let label = raw.label.trim().to_lowercase();
    if label.is_empty() {
        return None;
    }
    let neutral = neutral_vibe();
    let score = raw
        .score
        .filter(|s| s.is_finite())
        .map_or(neutral.score, |s| s.clamp(0.0, 1.0));
    let emoji = match raw.emoji.trim() {
        "" => neutral.emoji,
        e => e.to_string(),
    };
    let color = match raw.color.trim() {
        "" => neutral.color,
        c => c.to_string(),
    };
    Some(Vibe {
        label,
        score,
        emoji,
        color,
    })
}
