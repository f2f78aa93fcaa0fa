//! Reply-length control: match the user's register and trim to it.

use std::sync::LazyLock;

use kai_core::snapshot::{LengthHint, ReplyStyle, ReplyTone};
use kai_core::EmotionVector;
use regex::Regex;

const CHILL_INDICATORS: &[&str] = &[
    "lol", "lmao", "haha", "hehe", "jk", "idk", "tbh", "imo", "ngl", "😅", "😂", "👍", "😊", "🤷",
    "👀", "😭", "🥲", ":)", ":(", "xd",
];

const WANTS_SHORT: &[&str] = &[
    "short", "brief", "big text", "long text", "long message", "too long", "write big",
    "always write", "so long", "paragraph", "simple", "simpler",
];

/// No trimming at or above this many sentences.
const NO_TRIM: usize = 10;
const MAX_SENTENCES: usize = 4;

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Decide how long the next reply may be.
///
/// `recent` is the user's recent messages; when empty the current message
/// stands in for them.
pub fn reply_length<S: AsRef<str>>(message: &str, emotions: &EmotionVector, recent: &[S]) -> LengthHint {
    let lower = message.trim().to_lowercase();
    let words = word_count(message);
    let avg_words = if recent.is_empty() {
        words as f32
    } else {
        recent.iter().map(|m| word_count(m.as_ref())).sum::<usize>() as f32 / recent.len() as f32
    };
    let chill = CHILL_INDICATORS.iter().any(|c| lower.contains(c));
    let wants_short = WANTS_SHORT.iter().any(|w| lower.contains(w));

    let mut tone = ReplyTone::Normal;
    let mut instruction = String::new();

    let (style, mut max_sentences) = if wants_short || words <= 4 || avg_words <= 5.0 || chill {
        if wants_short {
            tone = ReplyTone::PlayfulShort;
            instruction = if lower.contains("simple") {
                "User asked for SIMPLE. Respond in simple, direct language. No metaphors. ONE sentence only."
                    .to_string()
            } else {
                "User wants SHORT replies. Reply in ONE short sentence.".to_string()
            };
        }
        (ReplyStyle::Casual, 1)
    } else if words >= 15 || avg_words >= 12.0 {
        (ReplyStyle::Deep, 3)
    } else {
        (ReplyStyle::Normal, 2)
    };

    if emotions.loneliness > 0.45 {
        max_sentences = (max_sentences + 1).min(MAX_SENTENCES);
    }
    if emotions.fear > 0.6 {
        max_sentences = (max_sentences + 1).min(MAX_SENTENCES);
    }
    if emotions.pride > 0.4 {
        max_sentences = max_sentences.saturating_sub(1).max(1);
    }

    if tone != ReplyTone::PlayfulShort && style == ReplyStyle::Casual && emotions.joy > 0.3 {
        tone = ReplyTone::PlayfulShort;
        max_sentences = 1;
    }

    if instruction.is_empty() {
        instruction = match style {
            ReplyStyle::Casual => {
                "Keep your reply to ONE short sentence. User is being casual, match their brevity."
            }
            ReplyStyle::Deep => "You may use 2-3 sentences. User is in a reflective mood.",
            ReplyStyle::Normal => "Keep your reply to 1-2 short sentences. Be concise.",
        }
        .to_string();
    }
    if tone == ReplyTone::PlayfulShort {
        instruction.push_str(" Slightly playful or self-aware is fine. Still one sentence.");
    }

    LengthHint {
        max_sentences,
        style,
        tone,
        instruction,
    }
}

static RE_SENTENCE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]\s+").unwrap());

/// Keep at most `max_sentences` sentences, splitting after `.`, `!` or `?`.
pub fn trim_reply(reply: &str, max_sentences: usize) -> String {
    let reply = reply.trim();
    if max_sentences >= NO_TRIM || reply.is_empty() {
        return reply.to_string();
    }
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in RE_SENTENCE_BREAK.find_iter(reply) {
        // keep the punctuation, drop the whitespace
        let end = m.start() + 1;
        sentences.push(reply[start..end].trim());
        start = m.end();
    }
    sentences.push(reply[start..].trim());
    sentences.retain(|s| !s.is_empty());

    if sentences.len() <= max_sentences {
        return reply.to_string();
    }
    sentences[..max_sentences.max(1)].join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calm() -> EmotionVector {
        EmotionVector::default()
    }

    #[test]
    fn test_casual_for_short_messages() {
        let h = reply_length("Hi!", &calm(), &["Hi!"]);
        assert_eq!(h.style, ReplyStyle::Casual);
        assert_eq!(h.max_sentences, 1);
        assert_eq!(h.tone, ReplyTone::Normal);
    }

    #[test]
    fn test_deep_for_long_messages() {
        let long = "I have been thinking a lot about what it means to actually be a good friend to someone lately";
        let h = reply_length(long, &calm(), &[long]);
        assert_eq!(h.style, ReplyStyle::Deep);
        assert_eq!(h.max_sentences, 3);
    }

    #[test]
    fn test_wants_short() {
        let h = reply_length("your messages are way too long man", &calm(), &["your messages are way too long man"]);
        assert_eq!(h.style, ReplyStyle::Casual);
        assert_eq!(h.tone, ReplyTone::PlayfulShort);
        assert!(h.instruction.contains("SHORT"));
    }

    #[test]
    fn test_emotion_modifiers() {
        let msg = "what did you get up to this weekend then";
        let lonely_afraid = EmotionVector {
            loneliness: 0.5,
            fear: 0.7,
            ..Default::default()
        };
        let h = reply_length(msg, &lonely_afraid, &[msg]);
        assert_eq!(h.style, ReplyStyle::Normal);
        assert_eq!(h.max_sentences, 4);

        let proud = EmotionVector {
            pride: 0.5,
            ..Default::default()
        };
        assert_eq!(reply_length(msg, &proud, &[msg]).max_sentences, 1);
    }

    #[test]
    fn test_casual_joy_is_playful() {
        let joyful = EmotionVector {
            joy: 0.4,
            loneliness: 0.9,
            ..Default::default()
        };
        let h = reply_length("lol ok", &joyful, &["lol ok"]);
        assert_eq!(h.tone, ReplyTone::PlayfulShort);
        assert_eq!(h.max_sentences, 1);
    }

    #[test]
    fn test_trim_reply() {
        assert_eq!(trim_reply("Hey! Good to see you. How are you?", 1), "Hey!");
        assert_eq!(
            trim_reply("Hey! Good to see you. How are you?", 2),
            "Hey! Good to see you."
        );
        assert_eq!(trim_reply("  One sentence only  ", 1), "One sentence only");
        assert_eq!(trim_reply("A. B. C.", 10), "A. B. C.");
        // Decimal points without trailing space are not breaks
        assert_eq!(trim_reply("Pi is 3.14 roughly.", 1), "Pi is 3.14 roughly.");
    }
}
