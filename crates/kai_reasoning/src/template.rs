//! Rule-based responder: intent plus state picks a line from a fixed pool.
//! Memories are context only and never echoed back.

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use kai_core::{pick, Intent, Mode, Responder, TurnSnapshot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const NAME: &str = "Kai";

const GREETINGS: &[&str] = &[
    "Hey! Good to see you.",
    "Hi there. How's it going?",
    "Hey! I've been thinking about some stuff.",
];
const GOODBYES: &[&str] = &[
    "Take care. Talk soon?",
    "Alright, I'll catch you later.",
    "Thanks for stopping by.",
];
const NOT_OKAY: &[&str] = &[
    "Not great, honestly. Been feeling heavy lately. But I'm working on it.",
    "I've been struggling a bit. Taking a mental break helps.",
    "Honestly? It's been rough. I'm trying to reset.",
];
const OKAY: &[&str] = &["Yeah, I'm good. Thanks for asking.", "All good here. You?"];
const INTERESTS: &[&str] = &[
    "I like learning new things and creating. Writing, building, thinking.",
    "I enjoy learning, creating stuff, and talking to people like you.",
    "Creating things, learning, and good conversations. That's what keeps me going.",
];
const TEASING: &[&str] = &[
    "Okay, that was unnecessary 😅",
    "Bruh 😅 rude.",
    "Alright alright, I'll allow it.",
    "Touché. You got me.",
];
const INSULT_REPEATED: &[&str] = &[
    "Okay, seriously. What's going on?",
    "We've been here before. What's up?",
];
const INSULT_TRUSTED: &[&str] = &[
    "Bruh 😅 rude.",
    "Okay, that was unnecessary 😅",
    "Hey, not cool. But I'll let it slide.",
];
const INSULT_FIRM: &[&str] = &["Hey, that wasn't cool.", "That wasn't okay.", "I'm not here for that."];
const APOLOGY_AFTER_HURT: &[&str] = &[
    "Thanks for saying that. I was hurt earlier, but I appreciate you being honest now.",
    "That means something. I was hurt, and hearing you say that helps.",
    "I appreciate that. It did hurt, but thanks for saying it.",
];
const APOLOGY: &[&str] = &["Thanks for saying that.", "I appreciate that."];
const WANTS_SHORT: &[&str] = &[
    "Bad habit. I talk too much sometimes.",
    "I get carried away. I'll keep it short.",
    "Yeah, I know. I'll try.",
];
const SOCIAL_INVITATION: &[&str] = &[
    "Sure, I'm here. What's on your mind?",
    "Yeah, we can talk. What's up?",
    "I'm around. Go ahead.",
];
const WHATS_THAT: &[&str] = &[
    "Sorry, which part? I can clarify.",
    "I'm not sure what you mean. Can you say which bit?",
    "Which thing? I want to answer properly.",
];
const REPAIR: &[&str] = &[
    "Sorry, I drifted. Let me answer properly.",
    "You're right, I missed that. What did you want to know?",
    "I got sidetracked. Ask again and I'll focus.",
];
const CONFUSED_WILLING: &[&str] = &[
    "Not much. You?",
    "Nothing special. What's up with you?",
    "Just here. What's on your mind?",
];
const CONFUSED_UNWILLING: &[&str] = &["You?", "Just zoning.", "Not much."];
const CONFLICT_FORGIVEN: &[&str] = &[
    "Yeah… that wasn't great, but you apologized later. I remember.",
    "I do. It hurt. You said sorry though, and that meant something.",
];

const SENSITIVE_LINES: &[&str] = &[
    "I've been thinking about that a lot lately...",
    "That's interesting. I feel like I'm still learning how to respond properly.",
    "I'm not sure I have a perfect answer, but I'm trying.",
];
const PLAYFUL_LINES: &[&str] = &[
    "You know what? I've got an idea!",
    "Hmm, that's a good one. Let me think.",
    "Okay okay, I hear you!",
];
const DISCIPLINED_LINES: &[&str] = &[
    "I'll think on that.",
    "Got it. I'm here.",
    "I hear you. Let's keep going.",
];
const WITTY_LINES: &[&str] = &[
    "Working. Which means staring at a draft and pretending it understands me.",
    "On a scale of tragic to surprisingly decent, I'm holding steady.",
    "I see you. I'm choosing to take that as a compliment.",
];

fn mode_lines(mode: Mode) -> &'static [&'static str] {
    match mode {
        Mode::Sensitive => SENSITIVE_LINES,
        Mode::Playful => PLAYFUL_LINES,
        Mode::Disciplined => DISCIPLINED_LINES,
    }
}

/// Answers every intent in character. Never fails.
pub struct TemplateResponder {
    rng: Mutex<StdRng>,
}

impl TemplateResponder {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Build the reply synchronously.
    pub fn compose(&self, message: &str, s: &TurnSnapshot) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let intent = s
            .intent
            .unwrap_or_else(|| kai_core::detect_intent(message));
        let reply = reply_for(intent, message, s, &mut *rng);
        reply.trim().to_string()
    }
}

impl Default for TemplateResponder {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl Responder for TemplateResponder {
    async fn respond(&self, message: &str, snapshot: &TurnSnapshot) -> Result<String> {
        Ok(self.compose(message, snapshot))
    }

    fn name(&self) -> &'static str {
        "template"
    }
}

fn reply_for<R: Rng + ?Sized>(intent: Intent, message: &str, s: &TurnSnapshot, rng: &mut R) -> String {
    match intent {
        Intent::Greeting => format!("{} {}", pick(rng, GREETINGS), reflection(s)),
        Intent::Farewell => pick(rng, GOODBYES).to_string(),
        Intent::HowAreYou => mood_reply(s, rng),
        Intent::EverythingOkay => {
            if s.feeling_low() {
                pick(rng, NOT_OKAY).to_string()
            } else {
                pick(rng, OKAY).to_string()
            }
        }
        Intent::MetaRepeating => "Yeah… I think I was stuck replaying stuff instead of really \
            responding. I'm still learning how to do this properly."
            .to_string(),
        Intent::JokeClarification => {
            "Oh! Okay, got it. I wasn't sure how to take that. Thanks for clarifying.".to_string()
        }
        Intent::AboutInterests => pick(rng, INTERESTS).to_string(),
        Intent::Teasing => pick(rng, TEASING).to_string(),
        Intent::Insult => {
            let pool = if s.boundary.abuse_count >= 2 {
                INSULT_REPEATED
            } else if s.user_trust >= 0.6 {
                INSULT_TRUSTED
            } else {
                INSULT_FIRM
            };
            pick(rng, pool).to_string()
        }
        Intent::Apology => {
            let pool = if s.recent_abuse() {
                APOLOGY_AFTER_HURT
            } else {
                APOLOGY
            };
            pick(rng, pool).to_string()
        }
        Intent::WantsShort => pick(rng, WANTS_SHORT).to_string(),
        Intent::AskName => match rng.gen_range(0..3) {
            0 => format!("I'm {NAME}."),
            1 => format!("My name is {NAME}."),
            _ => format!("{NAME}. Nice to meet you."),
        },
        Intent::SocialInvitation => pick(rng, SOCIAL_INVITATION).to_string(),
        Intent::WhatAreYouDoing => match s.recent_life_events.last() {
            Some(event) if rng.gen_bool(0.5) => format!("Not much. Earlier I {event}."),
            Some(event) => format!("Taking a break. Today I {event}."),
            None => "Just writing right now.".to_string(),
        },
        Intent::WhatsThat => pick(rng, WHATS_THAT).to_string(),
        Intent::Repair => pick(rng, REPAIR).to_string(),
        Intent::Confused => {
            let pool = if s.willing_to_talk {
                CONFUSED_WILLING
            } else {
                CONFUSED_UNWILLING
            };
            pick(rng, pool).to_string()
        }
        Intent::RememberConflict => {
            if s.user_violations > 0 && s.user_apologies > 0 {
                pick(rng, CONFLICT_FORGIVEN).to_string()
            } else if s.user_violations > 0 {
                "I remember. It wasn't easy. We can keep it respectful from here.".to_string()
            } else {
                "I'm not sure what you're referring to, but we're good now.".to_string()
            }
        }
        Intent::Question => answer_question(message),
        Intent::General => general_reply(s, rng),
    }
}

fn answer_question(message: &str) -> String {
    let m = message.to_lowercase();
    if m.contains("why") {
        "That's a good question. I don't always have a clean answer, but I'm thinking about it."
    } else if m.contains("what") {
        "Hmm. Let me think... I'd say it depends, but I'm open to your take."
    } else {
        "I'm not sure. What do you think?"
    }
    .to_string()
}

fn general_reply<R: Rng + ?Sized>(s: &TurnSnapshot, rng: &mut R) -> String {
    if let Some(reg) = &s.regulation {
        if !reg.regulated_response.is_empty() {
            return reg.regulated_response.clone();
        }
    }
    if s.humor.active && s.humor.level > 0.4 && rng.gen_bool(0.5) {
        return pick(rng, WITTY_LINES).to_string();
    }
    let line = pick(rng, mode_lines(s.mode));
    if !s.recent_memories.is_empty() && rng.gen_bool(0.3) {
        return format!(
            "{} I remember we've been chatting, it's nice. {}",
            line,
            reflection(s)
        );
    }
    format!("{} {}", line, reflection(s))
}

fn mood_reply<R: Rng + ?Sized>(s: &TurnSnapshot, rng: &mut R) -> String {
    let e = &s.emotion;
    if let Some(event) = s.recent_life_events.last() {
        if rng.gen_bool(0.5) {
            let event = capitalize(event);
            return if e.sadness > 0.5 {
                format!("Honestly? {event}. So a bit rough. But I'm working through it.")
            } else if e.joy > 0.5 || e.hope > 0.5 {
                format!("Pretty good. {event}, so yeah, not bad.")
            } else {
                format!("I'm okay. {event}. You?")
            };
        }
    }
    if e.joy > 0.6 {
        "I'm doing pretty well! Things feel good lately."
    } else if e.sadness > 0.5 {
        "Honestly? A bit down. But I'm working through it."
    } else if e.hope > 0.6 {
        "I'm hopeful. Taking it one day at a time."
    } else {
        "I'm okay. Some ups and downs, you know how it is."
    }
    .to_string()
}

fn reflection(s: &TurnSnapshot) -> &'static str {
    if s.hormones.loneliness > 0.6 {
        "It's nice to talk to someone."
    } else {
        ""
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
