//! Prompt contract sent to the provider.
//!
//! The system prompt lists every mode with the JSON field it must fill; the
//! user prompt carries the concrete request. Output is parsed by
//! [`crate::parse`].

use scribbly_core::assistant::{AssistantRequest, Mode, Tone};
use std::fmt::Write;

/// A system/user prompt pair for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

fn mode_instruction(mode: Mode) -> &'static str {
    match mode {
        Mode::Summary => r#"condense the post into one or two sentences in "summary""#,
        Mode::Reply => r#"write up to 3 short replies a reader could post, as strings in "suggestions""#,
        Mode::Tags => r#"extract up to 5 short lowercase topic tags into "tags""#,
        Mode::Polish => r#"rewrite the post to read clearly and naturally, keeping its meaning, in "summary""#,
        Mode::Emojify => r#"rewrite the post with fitting emoji added, in "summary""#,
        Mode::Title => r#"propose up to 3 catchy titles, as strings in "suggestions""#,
        Mode::Translate => r#"translate the post into the target language, in "translated_content""#,
        Mode::Vibe => {
            r##"judge the sentiment as "vibe": {"label": string, "score": number 0..1, "emoji": string, "color": "#RRGGBB"}, plus a one-line "summary""##
        }
    }
}

fn tone_instruction(tone: Tone) -> &'static str {
    match tone {
        Tone::Friendly => "warm and casual",
        Tone::Professional => "polished and courteous",
        Tone::Humorous => "playful and witty",
    }
}

/// The system prompt: role, JSON shape and per-mode contract.
pub fn system_prompt() -> String {
    let mut prompt = String::from(
        "You are a writing assistant for a social posting app. \
         Respond with a single JSON object and nothing else. \
         The object may contain: \"summary\" (string), \"suggestions\" (array of at most 3 strings), \
         \"tags\" (array of strings), \"translated_content\" (string), \"vibe\" (object).\n\
         Modes:\n",
    );
    for mode in Mode::ALL {
        let _ = writeln!(prompt, "- {mode}: {}", mode_instruction(mode));
    }
    prompt.push_str(
        "When include_tags is true, also fill \"tags\" regardless of mode. \
         Leave fields unrelated to the mode out.",
    );
    prompt
}

/// Build the prompt pair for `request`, using the already-trimmed `content`.
pub fn build(request: &AssistantRequest, content: &str) -> PromptPair {
    let mut user = String::new();
    let _ = writeln!(user, "mode: {}", request.mode);
    let _ = writeln!(
        user,
        "tone: {} ({})",
        request.tone,
        tone_instruction(request.tone)
    );
    let _ = writeln!(user, "include_tags: {}", request.include_tags);
    if request.mode == Mode::Translate {
        let _ = writeln!(user, "target_lang: {}", request.target_lang);
    }
    let _ = write!(user, "post:\n{content}");

    PromptPair {
        system: system_prompt(),
        user,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_lists_every_mode_and_field() {
        let prompt = system_prompt();
        for mode in Mode::ALL {
            assert!(prompt.contains(&format!("- {mode}:")), "missing {mode}");
            assert!(prompt.contains(mode.output_field()));
        }
        assert!(prompt.contains("JSON"));
    }

    #[test]
    fn user_prompt_carries_request_parameters() {
        let req = AssistantRequest::new("ignored", Mode::Reply).with_tone(Tone::Humorous);
        let pair = build(&req, "weekend hike");
        assert!(pair.user.contains("mode: reply"));
        assert!(pair.user.contains("tone: humorous"));
        assert!(pair.user.contains("include_tags: true"));
        assert!(pair.user.ends_with("weekend hike"));
        assert!(!pair.user.contains("target_lang"));
    }

    #[test]
    fn translate_prompt_names_target_language() {
        let req = AssistantRequest::new("bonjour", Mode::Translate).with_target_lang("ja");
        let pair = build(&req, "bonjour");
        assert!(pair.user.contains("target_lang: ja"));
    }
}
