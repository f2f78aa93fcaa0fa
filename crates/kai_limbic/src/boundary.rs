//! Boundary state machine: abuse tracking with hysteresis.
//!
//! `abuse_count` rises by one per insult but only falls by one after a
//! full streak of non-insult turns, so defense and disengagement are quick
//! to enter and slow to leave.

use std::collections::{HashMap, VecDeque};

use kai_core::config::BoundaryConfig;
use kai_core::pick;
use rand::Rng;
use serde::{Deserialize, Serialize};

const HISTORY_CAP: usize = 20;
const TOXIC_WINDOW: usize = 10;
const HARASSMENT_WINDOW: usize = 15;
const HARASSMENT_REPEATS: usize = 3;

const FIRST_DEFENSE_REPLIES: &[&str] = &[
    "Hey, that's not okay. I'm here for respectful conversation.",
    "Not cool. We can talk, but not like this.",
    "I'm not okay with being talked to like that.",
];

const BOUNDARY_REPLIES: &[&str] = &[
    "Hey, that's not okay. Let's change the topic.",
    "Not cool, man. I'm serious.",
    "I'm not comfortable with that.",
    "We can talk, but you need to respect boundaries.",
];

const DISENGAGE_REPLIES: &[&str] = &[
    "I'm going to step away. We can talk later when it's respectful.",
    "I need a break from this. Talk later.",
    "Not doing this right now. Let's reset.",
];

const COOLDOWN_REPLIES: &[&str] = &["Let's talk about something else.", "Different topic?", "Anyway."];

pub const HARASSMENT_REPLY: &str = "You've been repeating this. Let's change the tone.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryState {
    pub abuse_count: u32,
    /// Insult types, most recent last.
    pub history: VecDeque<String>,
    pub defense_mode: bool,
    pub cooldown: bool,
    pub disengaged_left: u32,
    pub toxic_session: bool,
    pub positive_streak: u32,
}

#[derive(Debug, Clone)]
pub struct BoundaryEngine {
    state: BoundaryState,
    config: BoundaryConfig,
}

impl BoundaryEngine {
    pub fn new(config: BoundaryConfig) -> Self {
        Self {
            state: BoundaryState::default(),
            config,
        }
    }

    /// Restore cross-session memory of past violations.
    pub fn seeded(config: BoundaryConfig, violations: u32) -> Self {
        let mut engine = Self::new(config);
        engine.state.abuse_count = violations;
        engine.state.defense_mode = violations >= engine.config.abuse_threshold;
        if violations > 0 {
            tracing::info!(
                "Boundary seeded with {} past violations (defense={})",
                violations,
                engine.state.defense_mode
            );
        }
        engine
    }

    pub fn state(&self) -> &BoundaryState {
        &self.state
    }

    pub fn config(&self) -> &BoundaryConfig {
        &self.config
    }

    pub fn abuse_count(&self) -> u32 {
        self.state.abuse_count
    }

    pub fn should_defend(&self) -> bool {
        self.state.defense_mode
    }

    pub fn is_cooldown(&self) -> bool {
        self.state.cooldown
    }

    pub fn is_disengaged(&self) -> bool {
        self.state.disengaged_left > 0
    }

    pub fn is_toxic(&self) -> bool {
        self.state.toxic_session
    }

    /// True exactly when the count has just reached the defense threshold.
    pub fn at_first_defense(&self) -> bool {
        self.state.abuse_count == self.config.abuse_threshold
    }

    /// Record one classified insult.
    pub fn record_abuse(&mut self, insult_type: Option<&str>) {
        let c = &self.config;
        let s = &mut self.state;
        s.abuse_count += 1;
        s.positive_streak = 0;

        if let Some(kind) = insult_type {
            s.history.push_back(kind.to_string());
            while s.history.len() > HISTORY_CAP {
                s.history.pop_front();
            }
        }

        if s.history.len() >= c.repeat_toxic
            && max_repeats(s.history.iter().rev().take(TOXIC_WINDOW)) >= c.repeat_toxic
        {
            if !s.toxic_session {
                tracing::warn!("Toxic session: same insult repeated {}+ times", c.repeat_toxic);
            }
            s.toxic_session = true;
            s.disengaged_left = s.disengaged_left.max(c.disengage_for);
        }

        if s.abuse_count >= c.abuse_threshold {
            s.defense_mode = true;
            if s.abuse_count > c.abuse_threshold {
                s.cooldown = true;
            }
        }

        if s.abuse_count >= c.disengage_after {
            s.disengaged_left = s.disengaged_left.max(c.disengage_for);
        }

        tracing::debug!(
            "abuse recorded: count={} defense={} cooldown={} disengaged_left={}",
            s.abuse_count,
            s.defense_mode,
            s.cooldown,
            s.disengaged_left
        );
    }

    /// Record one non-insult turn. Every full streak forgives one insult.
    pub fn record_positive(&mut self) {
        let c = &self.config;
        let s = &mut self.state;
        s.positive_streak += 1;
        if s.positive_streak < c.recovery_reset_after {
            return;
        }
        s.abuse_count = s.abuse_count.saturating_sub(1);
        s.positive_streak = 0;
        if s.abuse_count < c.abuse_threshold {
            s.defense_mode = false;
            s.cooldown = false;
        }
        if s.abuse_count < c.disengage_after && !s.toxic_session {
            s.disengaged_left = 0;
        }
        tracing::debug!("positive streak: abuse_count now {}", s.abuse_count);
    }

    /// Called once per disengaged turn. Running out while the session is
    /// toxic clears the toxic flag immediately.
    pub fn step_disengage(&mut self) {
        let s = &mut self.state;
        s.disengaged_left = s.disengaged_left.saturating_sub(1);
        if s.disengaged_left == 0 && s.toxic_session {
            s.toxic_session = false;
        }
    }

    /// Same insult type at least three times within the last 15.
    pub fn has_harassment_pattern(&self) -> bool {
        let h = &self.state.history;
        h.len() >= HARASSMENT_REPEATS
            && max_repeats(h.iter().rev().take(HARASSMENT_WINDOW)) >= HARASSMENT_REPEATS
    }

    pub fn first_defense_reply<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static str {
        pick(rng, FIRST_DEFENSE_REPLIES)
    }

    pub fn boundary_reply<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static str {
        pick(rng, BOUNDARY_REPLIES)
    }

    pub fn disengage_reply<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static str {
        pick(rng, DISENGAGE_REPLIES)
    }

    pub fn cooldown_reply<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static str {
        pick(rng, COOLDOWN_REPLIES)
    }

    pub fn harassment_reply(&self) -> &'static str {
        HARASSMENT_REPLY
    }

    /// Reply for an insult while defending: first-defense wording exactly
    /// at the threshold, the firmer pool afterwards.
    pub fn defense_reply<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static str {
        if self.at_first_defense() {
            self.first_defense_reply(rng)
        } else {
            self.boundary_reply(rng)
        }
    }

    /// Every line this engine can produce, for callers that need to
    /// recognise boundary replies.
    pub fn all_replies() -> impl Iterator<Item = &'static str> {
        FIRST_DEFENSE_REPLIES
            .iter()
            .chain(BOUNDARY_REPLIES)
            .chain(DISENGAGE_REPLIES)
            .chain(COOLDOWN_REPLIES)
            .copied()
            .chain(std::iter::once(HARASSMENT_REPLY))
    }
}

fn max_repeats<'a>(items: impl Iterator<Item = &'a String>) -> usize {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for item in items {
        *counts.entry(item.as_str()).or_default() += 1;
    }
    counts.values().copied().max().unwrap_or(0)
}
