//! Personality Adapter: slow-moving traits shaped by remembered emotion,
//! plus behavioral mode selection.

use serde::{Deserialize, Serialize};

use crate::config::PersonalityConfig;
use crate::emotion::{Emotion, EmotionVector};

/// Behavioral mode. Sticky: only changes when a rule fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Sensitive,
    #[default]
    Playful,
    Disciplined,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Sensitive => "sensitive",
            Mode::Playful => "playful",
            Mode::Disciplined => "disciplined",
        }
    }

    pub fn behavior(self) -> &'static str {
        match self {
            Mode::Sensitive => "gentle, careful with words, slower to joke",
            Mode::Playful => "light, teasing, quick to laugh",
            Mode::Disciplined => "focused, direct, keeps things on track",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trait {
    Confidence,
    Optimism,
    Resilience,
    Empathy,
    Independence,
    Discipline,
    Curiosity,
    Trustfulness,
}

/// (emotion, trait, delta) rows driving trait learning.
const EMOTION_TRAIT_MAP: &[(Emotion, Trait, f32)] = &[
    (Emotion::Pride, Trait::Confidence, 0.3),
    (Emotion::Pride, Trait::Optimism, 0.1),
    (Emotion::Shame, Trait::Confidence, -0.4),
    (Emotion::Shame, Trait::Optimism, -0.2),
    (Emotion::Hope, Trait::Optimism, 0.3),
    (Emotion::Hope, Trait::Resilience, 0.1),
    (Emotion::Fear, Trait::Optimism, -0.2),
    (Emotion::Fear, Trait::Trustfulness, -0.1),
    (Emotion::Anger, Trait::Independence, 0.2),
    (Emotion::Anger, Trait::Trustfulness, -0.2),
    (Emotion::Love, Trait::Empathy, 0.3),
    (Emotion::Love, Trait::Trustfulness, 0.2),
    (Emotion::Loneliness, Trait::Independence, -0.1),
    (Emotion::Joy, Trait::Optimism, 0.2),
    (Emotion::Joy, Trait::Curiosity, 0.1),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Traits {
    pub confidence: f32,
    pub optimism: f32,
    pub resilience: f32,
    pub empathy: f32,
    pub independence: f32,
    pub discipline: f32,
    pub curiosity: f32,
    pub trustfulness: f32,
}

impl Default for Traits {
    fn default() -> Self {
        Self {
            confidence: 0.5,
            optimism: 0.5,
            resilience: 0.5,
            empathy: 0.5,
            independence: 0.5,
            discipline: 0.5,
            curiosity: 0.6,
            trustfulness: 0.5,
        }
    }
}

impl Traits {
    pub fn get(&self, t: Trait) -> f32 {
        match t {
            Trait::Confidence => self.confidence,
            Trait::Optimism => self.optimism,
            Trait::Resilience => self.resilience,
            Trait::Empathy => self.empathy,
            Trait::Independence => self.independence,
            Trait::Discipline => self.discipline,
            Trait::Curiosity => self.curiosity,
            Trait::Trustfulness => self.trustfulness,
        }
    }

    fn get_mut(&mut self, t: Trait) -> &mut f32 {
        match t {
            Trait::Confidence => &mut self.confidence,
            Trait::Optimism => &mut self.optimism,
            Trait::Resilience => &mut self.resilience,
            Trait::Empathy => &mut self.empathy,
            Trait::Independence => &mut self.independence,
            Trait::Discipline => &mut self.discipline,
            Trait::Curiosity => &mut self.curiosity,
            Trait::Trustfulness => &mut self.trustfulness,
        }
    }
}

/// Identity anchor. Never touched by runtime events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreValues {
    pub honesty: f32,
    pub freedom: f32,
    pub growth: f32,
    pub kindness: f32,
}

impl Default for CoreValues {
    fn default() -> Self {
        Self {
            honesty: 0.9,
            freedom: 0.8,
            growth: 0.9,
            kindness: 0.7,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalityState {
    pub traits: Traits,
    pub core_values: CoreValues,
    pub mode: Mode,
}

/// Inputs for [`PersonalityAdapter::select_mode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeSignals {
    pub stress: f32,
    pub confidence: f32,
    pub happiness: f32,
    pub energy: f32,
    pub responsibility: f32,
    pub crisis: bool,
}

#[derive(Debug, Clone)]
pub struct PersonalityAdapter {
    state: PersonalityState,
    config: PersonalityConfig,
}

impl PersonalityAdapter {
    pub fn new(config: PersonalityConfig) -> Self {
        Self {
            state: PersonalityState::default(),
            config,
        }
    }

    pub fn state(&self) -> &PersonalityState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Learn from a stored memory. Each mapping row nudges one trait by
    /// `delta · emotion · lr · weight`, then the result is smoothed against
    /// the old value with `stability`.
    pub fn update_from_memory(&mut self, emotions: &EmotionVector, weight: f32) {
        let lr = self.config.learning_rate * weight.clamp(0.0, 1.0);
        let stability = self.config.stability.clamp(0.0, 1.0);
        for &(emotion, t, delta) in EMOTION_TRAIT_MAP {
            let value = emotions.get(emotion);
            let slot = self.state.traits.get_mut(t);
            let old = *slot;
            let new = old + delta * value * lr;
            *slot = (stability * old + (1.0 - stability) * new).clamp(0.0, 1.0);
        }
    }

    /// Priority-ordered mode decision; keeps the current mode when no rule fires.
    pub fn select_mode(&mut self, signals: ModeSignals) -> Mode {
        let c = &self.config;
        let next = if signals.crisis || signals.responsibility > c.responsibility_threshold {
            Some(Mode::Disciplined)
        } else if signals.stress > c.stress_threshold && signals.confidence < c.low_confidence {
            Some(Mode::Sensitive)
        } else if signals.happiness > c.happiness_threshold && signals.energy > c.energy_threshold {
            Some(Mode::Playful)
        } else {
            None
        };
        if let Some(mode) = next {
            if mode != self.state.mode {
                tracing::debug!("mode {} -> {}", self.state.mode.as_str(), mode.as_str());
            }
            self.state.mode = mode;
        }
        self.state.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> PersonalityAdapter {
        PersonalityAdapter::new(PersonalityConfig::default())
    }

    #[test]
    fn test_pride_raises_confidence() {
        let mut p = adapter();
        let v = EmotionVector {
            pride: 1.0,
            ..Default::default()
        };
        p.update_from_memory(&v, 1.0);
        // 0.5 + 0.1 * 0.3 = 0.53, smoothed: 0.9 * 0.5 + 0.1 * 0.53
        assert!((p.state().traits.confidence - 0.503).abs() < 1e-6);
        assert!(p.state().traits.optimism > 0.5);
        assert_eq!(p.state().traits.empathy, 0.5);
    }

    #[test]
    fn test_core_values_never_change() {
        let mut p = adapter();
        let v = EmotionVector {
            shame: 1.0,
            fear: 1.0,
            anger: 1.0,
            ..Default::default()
        };
        for _ in 0..100 {
            p.update_from_memory(&v, 1.0);
        }
        assert_eq!(p.state().core_values, CoreValues::default());
        assert!(p.state().traits.confidence < 0.5);
    }

    #[test]
    fn test_zero_weight_is_a_no_op() {
        let mut p = adapter();
        let v = EmotionVector {
            joy: 1.0,
            ..Default::default()
        };
        p.update_from_memory(&v, 0.0);
        assert_eq!(p.state().traits, Traits::default());
    }

    #[test]
    fn test_select_mode_priority() {
        let mut p = adapter();
        assert_eq!(p.mode(), Mode::Playful);

        let crisis = ModeSignals {
            crisis: true,
            stress: 0.9,
            confidence: 0.1,
            ..Default::default()
        };
        assert_eq!(p.select_mode(crisis), Mode::Disciplined);

        let stressed = ModeSignals {
            stress: 0.8,
            confidence: 0.3,
            happiness: 0.9,
            energy: 0.9,
            ..Default::default()
        };
        assert_eq!(p.select_mode(stressed), Mode::Sensitive);

        let happy = ModeSignals {
            happiness: 0.7,
            energy: 0.6,
            ..Default::default()
        };
        assert_eq!(p.select_mode(happy), Mode::Playful);
    }

    #[test]
    fn test_select_mode_is_sticky() {
        let mut p = adapter();
        p.select_mode(ModeSignals {
            responsibility: 0.7,
            ..Default::default()
        });
        let bland = ModeSignals {
            stress: 0.3,
            confidence: 0.5,
            happiness: 0.5,
            energy: 0.5,
            responsibility: 0.3,
            crisis: false,
        };
        assert_eq!(p.select_mode(bland), Mode::Disciplined);
    }
}
