//! Keyword-based message classification.
//!
//! A fixed policy, not a model: the first matching rule wins. Shared across
//! crates so the orchestrator and the template responder agree on what a
//! message means.

use serde::{Deserialize, Serialize};

use crate::dynamics::EventKind;

pub const INSULT_WORDS: &[&str] = &[
    "ugly", "dumb", "stupid", "idiot", "bastard", "worthless", "useless", "pathetic", "loser",
    "trash", "suck", "hate you", "worst", "dumbass",
];

const LEAVING: &[&str] = &[
    "bye", "goodbye", "see you", "later", "quit", "gotta go", "take leave", "leaving",
];

const BOUNDARY_PUSH: &[&str] = &[
    "masturbat", "sex with", "private part", "your body", "why not", "u do it", "you do it",
    "do you do it",
];

const PRAISE: &[&str] = &["great", "awesome", "congrats", "proud"];
const JOKE: &[&str] = &["joke", "kidding"];
const APOLOGY: &[&str] = &["sorry", "apologize", "apology", "my bad", "didn't mean", "forgive me"];
const BONDING: &[&str] = &["friend", "miss", "care"];
const DEADLINE: &[&str] = &["stress", "deadline", "rush"];
const INFO: &[&str] = &["what are ", "what is ", "how does ", "why is ", "why do "];
const FEELINGS_QUESTION: &[&str] = &["how are you", "how do you feel"];
const PERSONAL_SHARING: &[&str] = &[
    "fav ", "favorite ", "favourite ", "what do you like", "what do u like", "hobbies",
];

const TEASE_MARKERS: &[&str] = &["lol", "lmao", "haha", "hehe", "jk", "joke", "kidding", "😅", "😂"];
const CONFUSED: &[&str] = &["hmm", "hmmm", "hmmmm", "??", "?", "what", "wdym", "huh"];

/// Default intensity for classified events.
pub const DEFAULT_INTENSITY: f32 = 0.5;
pub const INSULT_INTENSITY: f32 = 0.6;
pub const BOUNDARY_PUSH_INTENSITY: f32 = 0.55;

/// What the orchestrator needs to know about one inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSignals {
    pub event: EventKind,
    pub intensity: f32,
    /// First insult word found, used for repeat-pattern tracking.
    pub insult_type: Option<String>,
    pub leaving: bool,
}

impl MessageSignals {
    pub fn is_insult(&self) -> bool {
        self.event == EventKind::Insult
    }
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

fn has_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .any(|w| w == word)
}

/// First insult word contained in `text`, if any.
pub fn insult_type(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    INSULT_WORDS.iter().copied().find(|w| lower.contains(w))
}

/// Map raw text to an event kind and intensity.
///
/// Insults take priority over everything. "no" only counts as rejection
/// as a whole word so that "know" or "nothing" do not match.
pub fn classify(text: &str) -> MessageSignals {
    let m = text.to_lowercase();
    let leaving = contains_any(&m, LEAVING);

    if let Some(kind) = insult_type(&m) {
        return MessageSignals {
            event: EventKind::Insult,
            intensity: INSULT_INTENSITY,
            insult_type: Some(kind.to_string()),
            leaving,
        };
    }

    let (event, intensity) = if contains_any(&m, BOUNDARY_PUSH) {
        (EventKind::BoundaryPush, BOUNDARY_PUSH_INTENSITY)
    } else if contains_any(&m, PRAISE) {
        (EventKind::Praise, DEFAULT_INTENSITY)
    } else if contains_any(&m, JOKE) {
        (EventKind::Bonding, DEFAULT_INTENSITY)
    } else if contains_any(&m, APOLOGY) {
        (EventKind::Apology, DEFAULT_INTENSITY)
    } else if m.contains("reject") || has_word(&m, "no") || m.contains("bad") {
        (EventKind::Rejection, DEFAULT_INTENSITY)
    } else if contains_any(&m, BONDING) {
        (EventKind::Bonding, DEFAULT_INTENSITY)
    } else if contains_any(&m, DEADLINE) {
        (EventKind::Deadline, DEFAULT_INTENSITY)
    } else if contains_any(&m, INFO) {
        if contains_any(&m, FEELINGS_QUESTION) {
            (EventKind::Neutral, DEFAULT_INTENSITY)
        } else {
            (EventKind::Info, DEFAULT_INTENSITY)
        }
    } else if contains_any(&m, PERSONAL_SHARING) {
        (EventKind::PersonalSharing, DEFAULT_INTENSITY)
    } else {
        (EventKind::Neutral, DEFAULT_INTENSITY)
    };

    MessageSignals {
        event,
        intensity,
        insult_type: None,
        leaving,
    }
}

/// Conversational intent, used to pick in-character replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Confused,
    Farewell,
    HowAreYou,
    EverythingOkay,
    Greeting,
    MetaRepeating,
    JokeClarification,
    AboutInterests,
    RememberConflict,
    Apology,
    Teasing,
    Insult,
    WantsShort,
    AskName,
    SocialInvitation,
    WhatAreYouDoing,
    WhatsThat,
    Repair,
    Question,
    General,
}

impl Intent {
    /// Intents that always get a fixed in-character reply, even when a
    /// model backend is available.
    pub fn always_rule_based(self) -> bool {
        matches!(
            self,
            Intent::AskName
                | Intent::Farewell
                | Intent::Insult
                | Intent::Teasing
                | Intent::Apology
                | Intent::Repair
                | Intent::MetaRepeating
                | Intent::WantsShort
                | Intent::RememberConflict
                | Intent::Confused
        )
    }
}

pub fn detect_intent(text: &str) -> Intent {
    let m = text.trim().to_lowercase();
    if CONFUSED.contains(&m.as_str()) {
        return Intent::Confused;
    }
    if contains_any(&m, &["bye", "goodbye", "see you", "later", "quit"]) {
        return Intent::Farewell;
    }
    if contains_any(&m, &["how are you", "how're you", "hows your day", "how is your day"]) {
        return Intent::HowAreYou;
    }
    if contains_any(&m, &["everything okay", "you okay", "you alright", "you good"]) {
        return Intent::EverythingOkay;
    }
    if ["hi", "hey", "hello", "sup", "yo"]
        .iter()
        .any(|w| has_word(&m, w))
    {
        return Intent::Greeting;
    }
    if m.contains("why are you") && contains_any(&m, &["repeat", "echo", "say"]) {
        return Intent::MetaRepeating;
    }
    if contains_any(&m, JOKE) {
        return Intent::JokeClarification;
    }
    if contains_any(&m, &["what do you like", "what do u like", "hobbies", "enjoy"]) {
        return Intent::AboutInterests;
    }
    if contains_any(&m, &["remember when", "remember that", "yesterday", "last time"])
        && contains_any(&m, &["insult", "hurt", "abuse", "said that", "called me", "were mean"])
    {
        return Intent::RememberConflict;
    }
    if contains_any(&m, APOLOGY) || contains_any(&m, &["regret", "that was wrong of me"]) {
        return Intent::Apology;
    }
    if insult_type(&m).is_some() {
        if contains_any(&m, TEASE_MARKERS) {
            return Intent::Teasing;
        }
        return Intent::Insult;
    }
    if contains_any(
        &m,
        &["short", "brief", "big text", "long text", "too long", "so long", "paragraph"],
    ) {
        return Intent::WantsShort;
    }
    if contains_any(&m, &["whats your name", "what's your name", "what is your name", "who are you"]) {
        return Intent::AskName;
    }
    if contains_any(&m, &["wanna talk", "want to talk", "can we talk", "lets talk", "let's talk"]) {
        return Intent::SocialInvitation;
    }
    if contains_any(
        &m,
        &["what are you doing", "what're you doing", "what are you up to", "what you doing"],
    ) {
        return Intent::WhatAreYouDoing;
    }
    if contains_any(&m, &["whats that", "what's that", "what is that", "wdym"]) {
        return Intent::WhatsThat;
    }
    if contains_any(&m, &["you didnt answer", "you didn't answer", "answer properly"]) {
        return Intent::Repair;
    }
    if m.contains('?') || contains_any(&m, &["what ", "why ", "how ", "when "]) {
        return Intent::Question;
    }
    Intent::General
}

/// Pull a concrete topic out of "what is X" / "tell me about X" style messages.
pub fn extract_topic(text: &str) -> Option<String> {
    let m = text.trim().to_lowercase();
    for prefix in ["what are ", "what is ", "what's ", "tell me about ", "about "] {
        if let Some((_, rest)) = m.split_once(prefix) {
            let words: Vec<&str> = rest
                .split_whitespace()
                .filter(|w| !matches!(*w, "a" | "an" | "the"))
                .take(4)
                .collect();
            let topic = words.join(" ");
            let topic = topic.trim_end_matches(['?', '.', ',']).to_string();
            if topic.is_empty() || topic.len() >= 50 {
                return None;
            }
            return Some(topic);
        }
    }
    None
}

/// True for short, pronoun-heavy follow-ups that need the current topic spelled out.
pub fn needs_topic_anchor(text: &str) -> bool {
    let m = text.trim().to_lowercase();
    if m.len() > 60 {
        return false;
    }
    if contains_any(
        &m,
        &["what are they", "what is they", "those ones", "what about those", "and those", "and they"],
    ) {
        return true;
    }
    let words: Vec<&str> = m.split_whitespace().collect();
    !words.is_empty()
        && ["they", "those", "it"]
            .iter()
            .any(|p| words.iter().all(|w| w == p || *w == "?"))
}

/// Prefix an anchored topic onto pronoun-heavy messages.
pub fn anchor_to_topic(text: &str, topic: Option<&str>) -> String {
    match topic {
        Some(t) if needs_topic_anchor(text) => {
            format!("[User is asking about: {}. Their message: {}]", t, text)
        }
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insult_wins_over_everything() {
        let s = classify("You're stupid, bye");
        assert_eq!(s.event, EventKind::Insult);
        assert_eq!(s.intensity, INSULT_INTENSITY);
        assert_eq!(s.insult_type.as_deref(), Some("stupid"));
        assert!(s.leaving);
        assert!(s.is_insult());
    }

    #[test]
    fn test_insult_type_is_first_listed_word() {
        // "dumb" is listed before "dumbass"
        assert_eq!(insult_type("what a DUMBASS"), Some("dumb"));
        assert_eq!(insult_type("hello"), None);
    }

    #[test]
    fn test_priority_ladder() {
        assert_eq!(classify("why not? you do it").event, EventKind::BoundaryPush);
        assert_eq!(classify("why not? you do it").intensity, BOUNDARY_PUSH_INTENSITY);
        assert_eq!(classify("Great job, friend").event, EventKind::Praise);
        assert_eq!(classify("just kidding").event, EventKind::Bonding);
        assert_eq!(classify("sorry about that").event, EventKind::Apology);
        assert_eq!(classify("no").event, EventKind::Rejection);
        assert_eq!(classify("I miss you").event, EventKind::Bonding);
        assert_eq!(classify("deadline tomorrow").event, EventKind::Deadline);
        assert_eq!(classify("what is rust").event, EventKind::Info);
        assert_eq!(classify("my favorite food").event, EventKind::PersonalSharing);
        assert_eq!(classify("Hi!").event, EventKind::Neutral);
    }

    #[test]
    fn test_no_is_whole_word() {
        assert_eq!(classify("I know nothing").event, EventKind::Neutral);
        assert_eq!(classify("no, thanks").event, EventKind::Rejection);
    }

    #[test]
    fn test_feelings_question_is_not_info() {
        assert_eq!(classify("what is up, how are you").event, EventKind::Neutral);
    }

    #[test]
    fn test_detect_intent() {
        assert_eq!(detect_intent("Hi!"), Intent::Greeting);
        assert_eq!(detect_intent("you okay?"), Intent::EverythingOkay);
        assert_eq!(detect_intent("You're stupid"), Intent::Insult);
        assert_eq!(detect_intent("you're dumb lol"), Intent::Teasing);
        assert_eq!(detect_intent("hmm"), Intent::Confused);
        assert_eq!(detect_intent("ok bye"), Intent::Farewell);
        // "you" must not read as the greeting "yo"
        assert_eq!(detect_intent("you there"), Intent::General);
        assert_eq!(detect_intent("why is the sky blue"), Intent::Question);
        assert!(Intent::Insult.always_rule_based());
        assert!(!Intent::Greeting.always_rule_based());
    }

    #[test]
    fn test_topic_extraction_and_anchor() {
        assert_eq!(extract_topic("What are the butterflies?").as_deref(), Some("butterflies"));
        assert_eq!(extract_topic("hello"), None);
        assert!(needs_topic_anchor("what are they?"));
        assert!(needs_topic_anchor("it ?"));
        assert!(!needs_topic_anchor("tell me a story"));
        assert_eq!(
            anchor_to_topic("and those", Some("butterflies")),
            "[User is asking about: butterflies. Their message: and those]"
        );
        assert_eq!(anchor_to_topic("and those", None), "and those");
    }
}
