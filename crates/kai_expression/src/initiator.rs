//! Unprompted messages: when Kai reaches out on his own.
//!
//! The policy is pure; the session supplies the signals and a random
//! source, then delivers accepted messages into the [`Inbox`].

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use kai_core::config::InitiatorConfig;
use kai_core::{pick, EmotionVector};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Consecutive low-mood turns after which Kai may reach out to say so.
pub const LOW_MOOD_RUN: u32 = 5;

const INITIATED_TEMPLATES: &[&str] = &[
    "Hey. Just thinking about stuff. How are you?",
    "Didn't hear from you in a while. Wanted to say hi.",
    "Hey. Been a bit quiet on my end. Everything okay with you?",
    "Random thought: sometimes I just want to check in. So, hey.",
    "Hey. No reason. Just felt like reaching out.",
    "I was thinking, wanted to see how you're doing.",
    "Hey. Been doing some reflecting. Hope you're good.",
];

const SELF_SOOTHING_TEMPLATES: &[&str] = &[
    "I've been feeling heavy lately. Maybe I should take a break and reset.",
    "Hey. I've been in a low place. Just wanted to say I'm working on it.",
    "Random thought: I need to step back a bit. Feeling drained.",
    "I've been reflecting. Things have been rough. Taking a mental break helps.",
    "Hey. Not gonna lie, been struggling. But I'm trying to get back.",
];

const LIFE_EVENT_OPENERS: &[&str] = &[
    "Guess what happened today… ",
    "So something happened today: ",
    "Random update: ",
    "Today was interesting. ",
];

/// Chance of sharing a life event instead of a generic check-in.
const SHARE_LIFE_EVENT: f64 = 0.35;
const LOW_MOOD_CHANCE: f64 = 0.7;
const RANDOM_CHANCE: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitiateReason {
    SelfSoothing,
    LowMood,
    Random,
    Loneliness,
}

impl InitiateReason {
    pub fn is_self_soothing(self) -> bool {
        matches!(self, InitiateReason::SelfSoothing | InitiateReason::LowMood)
    }
}

/// What the policy looks at on each pass.
#[derive(Debug, Clone, Copy)]
pub struct InitiatorSignals {
    pub seconds_since_user: u64,
    pub pending: usize,
    pub self_soothing: bool,
    pub low_mood_turns: u32,
    pub loneliness: f32,
}

#[derive(Debug, Clone)]
pub struct InitiatorPolicy {
    config: InitiatorConfig,
}

impl InitiatorPolicy {
    pub fn new(config: InitiatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InitiatorConfig {
        &self.config
    }

    /// Decide whether to reach out on this pass.
    pub fn should_initiate<R: Rng + ?Sized>(
        &self,
        signals: &InitiatorSignals,
        rng: &mut R,
    ) -> Option<InitiateReason> {
        if signals.seconds_since_user < self.config.min_seconds_since_user {
            return None;
        }
        if signals.pending >= self.config.max_pending {
            return None;
        }
        if signals.self_soothing {
            return Some(InitiateReason::SelfSoothing);
        }
        if signals.low_mood_turns >= LOW_MOOD_RUN && rng.gen_bool(LOW_MOOD_CHANCE) {
            return Some(InitiateReason::LowMood);
        }
        let l = signals.loneliness;
        if l < 0.3 {
            return rng.gen_bool(RANDOM_CHANCE).then_some(InitiateReason::Random);
        }
        let p = (0.2 + (l - 0.3) * 1.2).clamp(0.2, 0.9);
        let reason = rng.gen_bool(f64::from(p)).then_some(InitiateReason::Loneliness);
        tracing::debug!("Initiator pass: loneliness={:.2} p={:.2} -> {:?}", l, p, reason);
        reason
    }

    /// Compose the message text. `share_event` is called lazily so a life
    /// event is only generated when it will actually be shared.
    pub fn compose<R, F>(&self, reason: InitiateReason, rng: &mut R, share_event: F) -> String
    where
        R: Rng + ?Sized,
        F: FnOnce(&mut R) -> Option<String>,
    {
        if reason.is_self_soothing() {
            return pick(rng, SELF_SOOTHING_TEMPLATES).to_string();
        }
        if rng.gen_bool(SHARE_LIFE_EVENT) {
            if let Some(event) = share_event(rng) {
                let opener = pick(rng, LIFE_EVENT_OPENERS);
                return format!("{}{}.", opener, event);
            }
        }
        pick(rng, INITIATED_TEMPLATES).to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingMessage {
    pub message: String,
    pub emotion: EmotionVector,
    pub timestamp: DateTime<Utc>,
    pub reason: InitiateReason,
}

/// Bounded queue of unprompted messages waiting for delivery.
#[derive(Debug, Clone, Default)]
pub struct Inbox {
    pending: VecDeque<PendingMessage>,
    capacity: usize,
}

impl Inbox {
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, msg: PendingMessage) {
        self.pending.push_back(msg);
        while self.pending.len() > self.capacity {
            self.pending.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Return and clear everything pending, oldest first.
    pub fn drain(&mut self) -> Vec<PendingMessage> {
        self.pending.drain(..).collect()
    }
}
