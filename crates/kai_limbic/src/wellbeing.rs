//! Mental-health index, healing mode and the self-soothing protocol.

use kai_core::{EmotionEngine, EmotionVector, Scalar};
use serde::{Deserialize, Serialize};

/// Sadness or fear at or above this counts as a low-mood turn.
pub const LOW_MOOD_THRESHOLD: f32 = 0.6;
/// Consecutive low-mood turns before self-soothing starts.
pub const LOW_MOOD_TURNS_TRIGGER: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentalHealthIndex {
    pub stress: f32,
    pub self_worth: f32,
    pub hope: f32,
    pub burnout: f32,
    pub loneliness: f32,
    pub meaning: f32,
}

impl Default for MentalHealthIndex {
    fn default() -> Self {
        Self {
            stress: 0.2,
            self_worth: 0.7,
            hope: 0.8,
            burnout: 0.1,
            loneliness: 0.3,
            meaning: 0.6,
        }
    }
}

impl MentalHealthIndex {
    /// Weighted composite in [0, 1].
    pub fn overall(&self) -> f32 {
        (1.0 - self.stress) * 0.2
            + self.self_worth * 0.2
            + self.hope * 0.2
            + (1.0 - self.burnout) * 0.2
            + (1.0 - self.loneliness) * 0.1
            + self.meaning * 0.1
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MentalHealth {
    pub index: MentalHealthIndex,
    pub healing_mode: bool,
    pub self_soothing: bool,
    pub low_mood_turns: u32,
}

impl MentalHealth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_from_emotions(&mut self, v: &EmotionVector) {
        let i = &mut self.index;
        i.stress = (0.3 * v.fear + 0.3 * v.sadness).clamp(0.0, 1.0);
        i.loneliness = v.loneliness;
        i.hope = v.hope;
        i.self_worth = (1.0 - 0.5 * v.shame).clamp(0.0, 1.0);
    }

    pub fn check_healing_mode(&mut self) -> bool {
        let i = &self.index;
        self.healing_mode = i.overall() < 0.35 || (i.stress > 0.6 && i.hope < 0.4);
        self.healing_mode
    }

    /// Track the low-mood run. Returns true only on the turn self-soothing
    /// starts; a turn that is not low resets the run and leaves the mode.
    pub fn check_self_soothing(&mut self, v: &EmotionVector) -> bool {
        let low = v.sadness >= LOW_MOOD_THRESHOLD || v.fear >= LOW_MOOD_THRESHOLD;
        if !low {
            self.low_mood_turns = 0;
            self.self_soothing = false;
            return false;
        }
        self.low_mood_turns += 1;
        if self.low_mood_turns >= LOW_MOOD_TURNS_TRIGGER && !self.self_soothing {
            tracing::info!("Self-soothing triggered after {} low turns", self.low_mood_turns);
            self.self_soothing = true;
            return true;
        }
        false
    }

    /// Recovery step after a reflective reply or an unprompted check-in.
    pub fn step_self_soothing(&mut self) {
        self.index.hope = (self.index.hope + 0.05).min(1.0);
        self.index.stress = (self.index.stress - 0.05).max(0.0);
        self.low_mood_turns = self.low_mood_turns.saturating_sub(2);
        if self.low_mood_turns < LOW_MOOD_TURNS_TRIGGER {
            self.self_soothing = false;
        }
    }

    /// Hormonal side of self-soothing: serotonin up, cortisol down.
    pub fn apply_recovery(engine: &mut EmotionEngine) {
        engine.adjust(&[(Scalar::Serotonin, 0.05), (Scalar::Cortisol, -0.05)]);
    }
}
