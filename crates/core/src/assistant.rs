//! Assistant request and result value types.
//!
//! These are the values that flow through the whole pipeline:
//! web layer builds an [`AssistantRequest`] → orchestrator checks, caches,
//! generates or falls back → web layer receives an [`AssistantResult`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The requested transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Condense the text.
    #[default]
    Summary,
    /// Suggest up to three replies.
    Reply,
    /// Extract topic tags.
    Tags,
    /// Rewrite for clarity and tone.
    Polish,
    /// Rewrite with emoji sprinkled in.
    Emojify,
    /// Propose up to three titles.
    Title,
    /// Translate into `target_lang`.
    Translate,
    /// Score the sentiment.
    Vibe,
}

impl Mode {
    /// Every mode, in the order the prompt contract lists them.
    pub const ALL: [Mode; 8] = [
        Mode::Summary,
        Mode::Reply,
        Mode::Tags,
        Mode::Polish,
        Mode::Emojify,
        Mode::Title,
        Mode::Translate,
        Mode::Vibe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Summary => "summary",
            Mode::Reply => "reply",
            Mode::Tags => "tags",
            Mode::Polish => "polish",
            Mode::Emojify => "emojify",
            Mode::Title => "title",
            Mode::Translate => "translate",
            Mode::Vibe => "vibe",
        }
    }

    /// The result field this mode is expected to fill.
    pub fn output_field(&self) -> &'static str {
        match self {
            Mode::Summary | Mode::Polish | Mode::Emojify => "summary",
            Mode::Reply | Mode::Title => "suggestions",
            Mode::Tags => "tags",
            Mode::Translate => "translated_content",
            Mode::Vibe => "vibe",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown mode '{s}'"))
    }
}

/// The voice used for generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Friendly,
    Professional,
    Humorous,
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::Friendly, Tone::Professional, Tone::Humorous];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Friendly => "friendly",
            Tone::Professional => "professional",
            Tone::Humorous => "humorous",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tone::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown tone '{s}'"))
    }
}

/// One assistant call as received from the web layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantRequest {
    pub content: String,

    #[serde(default)]
    pub mode: Mode,

    #[serde(default)]
    pub tone: Tone,

    #[serde(default = "default_true")]
    pub include_tags: bool,

    #[serde(default = "default_target_lang")]
    pub target_lang: String,
}

fn default_true() -> bool {
    true
}

fn default_target_lang() -> String {
    "zh".into()
}

impl AssistantRequest {
    /// A request with default tone, tags on and the default target language.
    pub fn new(content: impl Into<String>, mode: Mode) -> Self {
        Self {
            content: content.into(),
            mode,
            tone: Tone::default(),
            include_tags: true,
            target_lang: default_target_lang(),
        }
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_tags(mut self, include_tags: bool) -> Self {
        self.include_tags = include_tags;
        self
    }

    pub fn with_target_lang(mut self, lang: impl Into<String>) -> Self {
        self.target_lang = lang.into();
        self
    }
}

/// Outcome class of a completed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Ok,
    Sensitive,
    Error,
}

/// Sentiment reading produced by `vibe` mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vibe {
    pub label: String,
    /// In `[0, 1]`.
    pub score: f64,
    pub emoji: String,
    pub color: String,
}

/// The structured reply. Every key is always present in the serialized
/// shape; fields unrelated to the requested mode stay empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssistantResult {
    #[serde(default)]
    pub status: Status,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub suggestions: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub translated_content: Option<String>,

    #[serde(default)]
    pub vibe: Option<Vibe>,
}

impl AssistantResult {
    /// Maximum number of suggestions a result may carry.
    pub const MAX_SUGGESTIONS: usize = 3;

    /// An `ok` result with every content field empty.
    pub fn ok() -> Self {
        Self::default()
    }

    /// A `sensitive` result with every content field empty.
    pub fn sensitive() -> Self {
        Self {
            status: Status::Sensitive,
            ..Self::default()
        }
    }

    /// All human-readable text in the result, space-joined.
    ///
    /// This is what the output safety check scans.
    pub fn text_for_screening(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(summary) = &self.summary {
            parts.push(summary);
        }
        parts.extend(self.suggestions.iter().map(String::as_str));
        parts.extend(self.tags.iter().map(String::as_str));
        if let Some(translated) = &self.translated_content {
            parts.push(translated);
        }
        if let Some(vibe) = &self.vibe {
            parts.push(&vibe.label);
        }
        parts.join(" ")
    }

    /// Whether any content field is populated.
    pub fn has_content(&self) -> bool {
        self.summary.is_some()
            || !self.suggestions.is_empty()
            || !self.tags.is_empty()
            || self.translated_content.is_some()
            || self.vibe.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_from_minimal_json() {
        let req: AssistantRequest = serde_json::from_str(r#"{"content":"hello"}"#).unwrap();
        assert_eq!(req.mode, Mode::Summary);
        assert_eq!(req.tone, Tone::Friendly);
        assert!(req.include_tags);
        assert_eq!(req.target_lang, "zh");
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let res: std::result::Result<AssistantRequest, _> =
            serde_json::from_str(r#"{"content":"hello","mode":"shout"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn mode_from_str_is_case_insensitive() {
        assert_eq!("Translate".parse::<Mode>().unwrap(), Mode::Translate);
        assert_eq!(" vibe ".parse::<Mode>().unwrap(), Mode::Vibe);
        assert!("nope".parse::<Mode>().is_err());
        assert_eq!("HUMOROUS".parse::<Tone>().unwrap(), Tone::Humorous);
    }

    #[test]
    fn result_shape_always_has_every_key() {
        let json = serde_json::to_value(AssistantResult::sensitive()).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "status",
            "summary",
            "suggestions",
            "tags",
            "translated_content",
            "vibe",
        ] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
        assert_eq!(obj["status"], "sensitive");
        assert!(obj["summary"].is_null());
    }

    #[test]
    fn screening_text_joins_all_fields() {
        let result = AssistantResult {
            summary: Some("short".into()),
            suggestions: vec!["one".into(), "two".into()],
            tags: vec!["food".into()],
            translated_content: Some("court".into()),
            vibe: Some(Vibe {
                label: "happy".into(),
                score: 0.9,
                emoji: "😀".into(),
                color: "#FFD54F".into(),
            }),
            ..AssistantResult::ok()
        };
        assert_eq!(result.text_for_screening(), "short one two food court happy");
        assert!(!AssistantResult::ok().has_content());
        assert!(result.has_content());
    }

    #[test]
    fn output_field_per_mode() {
        assert_eq!(Mode::Polish.output_field(), "summary");
        assert_eq!(Mode::Title.output_field(), "suggestions");
        assert_eq!(Mode::Translate.output_field(), "translated_content");
    }
}
