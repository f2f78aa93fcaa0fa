//! The typed state handed to response generation each turn.

use serde::{Deserialize, Serialize};

use crate::emotion::EmotionVector;
use crate::persona::Mode;
use crate::sentiment::Intent;
use crate::state::EmotionalState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStyle {
    Casual,
    #[default]
    Normal,
    Deep,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyTone {
    #[default]
    Normal,
    PlayfulShort,
}

/// Target length and register for the next reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LengthHint {
    pub max_sentences: usize,
    pub style: ReplyStyle,
    pub tone: ReplyTone,
    /// Plain-language instruction for model backends.
    pub instruction: String,
}

impl Default for LengthHint {
    fn default() -> Self {
        Self {
            max_sentences: 2,
            style: ReplyStyle::Normal,
            tone: ReplyTone::Normal,
            instruction: "Keep your reply to 1-2 short sentences. Be concise.".to_string(),
        }
    }
}

/// Output of the coping regulator when an overload was detected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulationDirective {
    /// Ordered regulation steps plus tone, ready to inline into a prompt.
    pub context: String,
    /// Internal self-talk line keyed by the dominant negative emotion.
    pub internal_thought: String,
    /// Calm fallback reply.
    pub regulated_response: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryFlags {
    pub abuse_count: u32,
    pub defense_mode: bool,
    pub cooldown: bool,
    pub toxic_session: bool,
    pub disengaged_left: u32,
    pub harassment_pattern: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementSignals {
    pub sum: i32,
    pub disable_affection: bool,
    pub switch_topic: bool,
    pub minimal: bool,
}

/// Light-wit gate for this turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HumorSignals {
    pub active: bool,
    /// Running appetite for jokes, 0..=1. Rises with playful messages.
    pub level: f32,
}

/// Everything a responder may read. Built fresh each turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnSnapshot {
    pub mode: Mode,
    pub mode_behavior: String,
    pub hormones: EmotionalState,
    pub emotion: EmotionVector,
    pub intent: Option<Intent>,
    pub regulation: Option<RegulationDirective>,
    pub recent_memories: Vec<String>,
    pub recent_life_events: Vec<String>,
    pub conversation_context: String,
    pub current_topic: Option<String>,
    pub user_trust: f32,
    pub user_apologies: u32,
    pub user_violations: u32,
    pub boundary: BoundaryFlags,
    pub engagement: EngagementSignals,
    pub self_soothing: bool,
    pub healing_mode: bool,
    pub willing_to_talk: bool,
    pub length: LengthHint,
    pub humor: HumorSignals,
    /// Set when one heavy topic keeps coming back; tells the model to let it rest.
    pub topic_saturation: Option<String>,
}

impl TurnSnapshot {
    pub fn recent_abuse(&self) -> bool {
        self.boundary.abuse_count > 0
    }

    pub fn emotional_overload(&self) -> bool {
        self.regulation.is_some()
    }

    /// Sadness or fear above 0.6, or self-soothing in progress.
    pub fn feeling_low(&self) -> bool {
        self.self_soothing || self.emotion.sadness > 0.6 || self.emotion.fear > 0.6
    }
}
