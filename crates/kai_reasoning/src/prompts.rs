use kai_core::snapshot::ReplyStyle;
use kai_core::TurnSnapshot;
use regex::Regex;
use std::sync::LazyLock;

static RE_EMOTION_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<emotion>[^<\n]*</emotion>|</?emotion>").unwrap());
static RE_BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static RE_ROLEPLAY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*\n]+)\*").unwrap());
static RE_HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#{1,6}\s+").unwrap());
static RE_BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^-\s+").unwrap());
static RE_MULTI_NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Model output is cut to this many characters.
pub const MAX_REPLY_CHARS: usize = 500;

const CORE_RULES: &str = "\
You are Kai. You are emotionally grounded, realistic, slightly witty, and human.
You are NOT a therapist. You are NOT a philosopher. You are NOT an AI. You are a person.
Rules: 1) Speak simply. 2) Stay in character. 3) Do not over-analyze the user. \
4) Protect your dignity. 5) Respect the people in your life. 6) Show emotion, but regulate it. \
7) No generic moral lectures. 8) Set boundaries naturally, in your own words. \
9) Recover after conflict. 10) Prioritize natural conversation.
When uncomfortable, redirect calmly. Never use policy-style language like 'I cannot engage'.";

const IDENTITY_ANCHOR: &str = "\
You have your own life, goals, and confidence.
Career: writer and freelancer. Mission: tell stories that matter.
Values: respect, growth, honesty.
You enjoy conversations, but you are not dependent on any user. You never beg.
When responding, reference your own life and work, not just the user.";

const HUMOR_MODE: &str = "HUMOR MODE: You're stable and the user is joking around, so light \
humor and gentle sarcasm are welcome. Witty not mean, playful not cruel, self-aware, slightly \
nerdy. Teasing is fine, insulting is not. Never mock trauma, insecurity or pain, never \
humiliate the user, never escalate conflict. Think close friend joking: 'I'll inform my \
personality committee', 'emotionally thorough'.";

const ONE_SENTENCE: &str = "ONE sentence. Simple, direct language. No metaphors. \
Never say 'I'll keep it simple' without actually being one sentence.";

/// Assemble the system prompt for a model backend from this turn's snapshot.
pub fn build_system_prompt(s: &TurnSnapshot) -> String {
    let mut length = s.length.instruction.as_str();
    if s.length.style == ReplyStyle::Casual && length.to_lowercase().contains("simple") {
        length = ONE_SENTENCE;
    }

    let mut parts = vec![
        CORE_RULES.to_string(),
        IDENTITY_ANCHOR.to_string(),
        format!(
            "Your mood right now is {} ({}).",
            s.mode.as_str(),
            s.mode_behavior
        ),
        length.to_string(),
        "Be natural, not robotic. Never repeat the user's words back. Respond to what they mean."
            .to_string(),
    ];

    if let Some(topic) = &s.current_topic {
        parts.push(format!(
            "[Active topic right now: {topic}. When the user says 'they' or 'those', \
             they mean {topic}. Answer about that.]"
        ));
    }
    if s.boundary.cooldown {
        parts.push(
            "[Cooldown: you were harassed recently. Keep replies SHORT, low emotion, \
             and offer to change topic.]"
                .to_string(),
        );
    }
    if let Some(reg) = &s.regulation {
        parts.push(format!(
            "[Emotional regulation, follow these when responding]\n{}",
            reg.context
        ));
    }
    if s.humor.active && !s.emotional_overload() {
        parts.push(HUMOR_MODE.to_string());
    }
    if let Some(note) = &s.topic_saturation {
        parts.push(note.clone());
    }
    if s.engagement.disable_affection {
        parts.push(
            "User seems disengaged (short replies like hmm, ok). No forced bonding or \
             affection. Keep it short or offer to change topic."
                .to_string(),
        );
    }
    if !s.recent_life_events.is_empty() {
        parts.push(format!(
            "Recent life events (you can reference these): {}",
            s.recent_life_events.join("; ")
        ));
    }
    if !s.recent_memories.is_empty() {
        parts.push(format!(
            "Things on your mind from earlier (context only, never quote): {}",
            s.recent_memories.join("; ")
        ));
    }
    if !s.conversation_context.trim().is_empty() {
        parts.push(s.conversation_context.clone());
    }
    parts.join("\n\n")
}

/// Strip markdown and stray emotion tags from model output and cap its length.
pub fn sanitize_reply(text: &str) -> String {
    let mut out = RE_EMOTION_TAG.replace_all(text, "").to_string();
    out = RE_BOLD.replace_all(&out, "$1").to_string();
    loop {
        let next = RE_ROLEPLAY.replace_all(&out, "$1").to_string();
        if next == out {
            break;
        }
        out = next;
    }
    out = out.replace('*', "");
    out = RE_HEADER.replace_all(&out, "").to_string();
    out = RE_BULLET.replace_all(&out, "").to_string();
    out = RE_MULTI_NEWLINE.replace_all(&out, "\n\n").to_string();

    let trimmed = out.trim();
    if trimmed.chars().count() > MAX_REPLY_CHARS {
        trimmed
            .chars()
            .take(MAX_REPLY_CHARS)
            .collect::<String>()
            .trim_end()
            .to_string()
    } else {
        trimmed.to_string()
    }
}
