use serde::{Deserialize, Serialize};

use crate::state::{round2, EmotionalState};

/// Named dimensions of the derived emotion vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Love,
    Shame,
    Pride,
    Hope,
    Loneliness,
}

impl Emotion {
    pub const ALL: [Emotion; 9] = [
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Love,
        Emotion::Shame,
        Emotion::Pride,
        Emotion::Hope,
        Emotion::Loneliness,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Sadness => "sadness",
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Love => "love",
            Emotion::Shame => "shame",
            Emotion::Pride => "pride",
            Emotion::Hope => "hope",
            Emotion::Loneliness => "loneliness",
        }
    }
}

/// Emotion vector derived from [`EmotionalState`]. Every component is in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionVector {
    pub joy: f32,
    pub sadness: f32,
    pub anger: f32,
    pub fear: f32,
    pub love: f32,
    pub shame: f32,
    pub pride: f32,
    pub hope: f32,
    pub loneliness: f32,
}

impl EmotionVector {
    pub fn from_state(s: &EmotionalState) -> Self {
        let c = |v: f32| v.clamp(0.0, 1.0);
        Self {
            joy: c(s.dopamine * (1.0 - s.cortisol)),
            sadness: c(0.5 * s.loneliness + 0.5 * s.cortisol),
            anger: c((s.anger_irritation + s.anger_rage) / 2.0),
            fear: c(s.amygdala),
            love: c((s.love_attachment + s.oxytocin) / 2.0),
            shame: c(s.cortisol * s.amygdala),
            pride: c(s.dopamine * s.testosterone),
            hope: c(s.serotonin * (1.0 - s.cortisol)),
            loneliness: c(s.loneliness),
        }
    }

    pub fn get(&self, emotion: Emotion) -> f32 {
        match emotion {
            Emotion::Joy => self.joy,
            Emotion::Sadness => self.sadness,
            Emotion::Anger => self.anger,
            Emotion::Fear => self.fear,
            Emotion::Love => self.love,
            Emotion::Shame => self.shame,
            Emotion::Pride => self.pride,
            Emotion::Hope => self.hope,
            Emotion::Loneliness => self.loneliness,
        }
    }

    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        Emotion::ALL.iter().map(move |e| self.get(*e))
    }

    pub fn max(&self) -> f32 {
        self.values().fold(0.0, f32::max)
    }

    pub fn mean(&self) -> f32 {
        self.values().sum::<f32>() / Emotion::ALL.len() as f32
    }

    /// Dot product over shared dimensions.
    pub fn similarity(&self, other: &EmotionVector) -> f32 {
        Emotion::ALL
            .iter()
            .map(|e| self.get(*e) * other.get(*e))
            .sum()
    }

    /// Strongest emotion, ties resolved in [`Emotion::ALL`] order.
    pub fn dominant(&self) -> (Emotion, f32) {
        Emotion::ALL
            .iter()
            .map(|e| (*e, self.get(*e)))
            .fold((Emotion::Joy, f32::MIN), |best, cur| {
                if cur.1 > best.1 {
                    cur
                } else {
                    best
                }
            })
    }

    /// Rounded to 2 decimals for display and persistence.
    pub fn rounded(&self) -> Self {
        Self {
            joy: round2(self.joy),
            sadness: round2(self.sadness),
            anger: round2(self.anger),
            fear: round2(self.fear),
            love: round2(self.love),
            shame: round2(self.shame),
            pride: round2(self.pride),
            hope: round2(self.hope),
            loneliness: round2(self.loneliness),
        }
    }

    /// Compact one-line form, e.g. `joy 0.40 | sadness 0.25 | ...`.
    pub fn stat_line(&self) -> String {
        Emotion::ALL
            .iter()
            .map(|e| format!("{} {:.2}", e.name(), self.get(*e)))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formulas_from_default_state() {
        let v = EmotionalState::default().to_emotion_vector();
        // dopamine 0.5, cortisol 0.2
        assert!((v.joy - 0.4).abs() < 1e-6);
        // 0.5 * 0.3 + 0.5 * 0.2
        assert!((v.sadness - 0.25).abs() < 1e-6);
        assert_eq!(v.anger, 0.0);
        assert!((v.fear - 0.2).abs() < 1e-6);
        assert!((v.love - 0.25).abs() < 1e-6);
        assert!((v.shame - 0.04).abs() < 1e-6);
        assert!((v.pride - 0.25).abs() < 1e-6);
        assert!((v.hope - 0.4).abs() < 1e-6);
        assert!((v.loneliness - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_similarity_and_dominant() {
        let a = EmotionVector {
            fear: 0.9,
            shame: 0.5,
            ..Default::default()
        };
        let b = EmotionVector {
            fear: 1.0,
            ..Default::default()
        };
        assert!((a.similarity(&b) - 0.9).abs() < 1e-6);
        assert_eq!(a.dominant(), (Emotion::Fear, 0.9));
        assert!((a.max() - 0.9).abs() < 1e-6);
    }
}
