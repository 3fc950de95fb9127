//! Heuristic fallback — deterministic, network-free answers for every mode.
//!
//! This is the safety net for provider outages, so it never fails and never
//! uses randomness: identical arguments always produce identical output.

use scribbly_core::assistant::{AssistantRequest, AssistantResult, Mode, Tone, Vibe};

/// Keyword → tag table. A keyword appearing anywhere in the lower-cased
/// content yields its tag; output follows table order.
const KEYWORD_TAGS: [(&str, &str); 7] = [
    ("travel", "travel"),
    ("food", "food"),
    ("music", "music"),
    ("movie", "movie"),
    ("sport", "sport"),
    ("tech", "tech"),
    ("study", "study"),
];

const EMOJIFY_SUFFIX: &str = " ✨";
const ELLIPSIS: &str = "...";

/// Deterministic generator used when the provider is absent or unusable.
#[derive(Debug, Clone)]
pub struct HeuristicFallbackEngine {
    summary_chars: usize,
}

impl HeuristicFallbackEngine {
    pub fn new(summary_chars: usize) -> Self {
        Self { summary_chars }
    }

    /// Produce a result for `request` without touching the network.
    pub fn fallback(&self, request: &AssistantRequest) -> AssistantResult {
        let content = request.content.trim();
        let tags = if request.include_tags {
            keyword_tags(content)
        } else {
            Vec::new()
        };

        match request.mode {
            Mode::Summary => self.summary(content, tags),
            Mode::Polish => self.polish(content, tags),
            Mode::Emojify => self.emojify(content, tags),
            Mode::Reply => Self::reply(content, request.tone),
            Mode::Tags => Self::tags(content),
            Mode::Title => Self::title(content, tags),
            Mode::Translate => Self::translate(content, tags),
            Mode::Vibe => Self::vibe(content, tags),
        }
    }

    fn summary(&self, content: &str, tags: Vec<String>) -> AssistantResult {
        AssistantResult {
            summary: Some(truncate(content, self.summary_chars)),
            tags,
            ..AssistantResult::ok()
        }
    }

    /// No rewriting capability offline: the heuristic summary comes back as is.
    fn polish(&self, content: &str, tags: Vec<String>) -> AssistantResult {
        self.summary(content, tags)
    }

    fn emojify(&self, content: &str, tags: Vec<String>) -> AssistantResult {
        AssistantResult {
            summary: Some(format!(
                "{}{EMOJIFY_SUFFIX}",
                truncate(content, self.summary_chars)
            )),
            tags,
            ..AssistantResult::ok()
        }
    }

    fn reply(content: &str, tone: Tone) -> AssistantResult {
        let gist = truncate(content, 30);
        let suggestions = match tone {
            Tone::Friendly => vec![
                format!("Love this! {gist}"),
                format!("Thanks for sharing \"{gist}\", it made my day."),
                "Can't wait to hear more about it!".to_string(),
            ],
            Tone::Professional => vec![
                format!("Thank you for sharing: {gist}"),
                format!("Well put. Noted on \"{gist}\"."),
                "I'd be glad to discuss this further.".to_string(),
            ],
            Tone::Humorous => vec![
                format!("\"{gist}\" just won the internet today 😄"),
                format!("Plot twist: I was thinking about \"{gist}\" too."),
                "Bookmarking this before my cat deletes it.".to_string(),
            ],
        };
        AssistantResult {
            suggestions,
            ..AssistantResult::ok()
        }
    }

    fn tags(content: &str) -> AssistantResult {
        AssistantResult {
            tags: keyword_tags(content),
            ..AssistantResult::ok()
        }
    }

    fn title(content: &str, tags: Vec<String>) -> AssistantResult {
        let headline = content.lines().next().unwrap_or(content).trim();
        AssistantResult {
            suggestions: vec![
                truncate(headline, 20),
                format!("{}: my thoughts", truncate(headline, 12)),
                format!("On {}", truncate(headline, 30)),
            ],
            tags,
            ..AssistantResult::ok()
        }
    }

    /// Identity translation: the content is returned unchanged.
    fn translate(content: &str, tags: Vec<String>) -> AssistantResult {
        AssistantResult {
            translated_content: Some(content.to_string()),
            tags,
            ..AssistantResult::ok()
        }
    }

    fn vibe(content: &str, tags: Vec<String>) -> AssistantResult {
        AssistantResult {
            summary: Some(content.to_string()),
            vibe: Some(neutral_vibe()),
            tags,
            ..AssistantResult::ok()
        }
    }
}

impl Default for HeuristicFallbackEngine {
    fn default() -> Self {
        Self::new(120)
    }
}

/// The constant sentiment reading used when nothing better is known.
pub fn neutral_vibe() -> Vibe {
    Vibe {
        label: "neutral".into(),
        score: 0.5,
        emoji: "😐".into(),
        color: "#9E9E9E".into(),
    }
}

/// Tags from [`KEYWORD_TAGS`] whose keyword occurs in `content`.
pub fn keyword_tags(content: &str) -> Vec<String> {
    let lowered = content.to_lowercase();
    KEYWORD_TAGS
        .iter()
        .filter(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, tag)| tag.to_string())
        .collect()
}

/// First `max_chars` characters of `text`, with an ellipsis if cut.
/// Whitespace left dangling at the cut is dropped before the ellipsis.
fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{ELLIPSIS}", text[..byte_idx].trim_end()),
        None => text.to_string(),
    }
}
