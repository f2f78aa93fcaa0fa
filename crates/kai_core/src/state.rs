//! Hormonal / emotional scalar state.
//!
//! Every field lives in [0, 1]. Fields are walked through the [`Scalar`]
//! table rather than by name, so clamping, decay and regulation all share
//! one explicit list of identifiers.

use serde::{Deserialize, Serialize};

use crate::config::EmotionConfig;
use crate::emotion::EmotionVector;

/// Guard against NaN and Infinity in state values.
/// If the value is NaN or Inf, replace with the provided fallback (the field default).
#[inline]
pub(crate) fn sanitize_f32(v: f32, fallback: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        tracing::warn!("NaN/Inf detected in state, resetting to fallback {}", fallback);
        fallback
    }
}

/// Identifier for one scalar of [`EmotionalState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scalar {
    Dopamine,
    Cortisol,
    Oxytocin,
    Serotonin,
    Adrenaline,
    Melatonin,
    Testosterone,
    Estrogen,
    Lh,
    Loneliness,
    Curiosity,
    Amygdala,
    Hippocampus,
    LoveAttachment,
    LoveTrust,
    LoveIntimacy,
    LoveCare,
    AngerIrritation,
    AngerRage,
    AngerResentment,
    AngerInjustice,
}

impl Scalar {
    pub const ALL: [Scalar; 21] = [
        Scalar::Dopamine,
        Scalar::Cortisol,
        Scalar::Oxytocin,
        Scalar::Serotonin,
        Scalar::Adrenaline,
        Scalar::Melatonin,
        Scalar::Testosterone,
        Scalar::Estrogen,
        Scalar::Lh,
        Scalar::Loneliness,
        Scalar::Curiosity,
        Scalar::Amygdala,
        Scalar::Hippocampus,
        Scalar::LoveAttachment,
        Scalar::LoveTrust,
        Scalar::LoveIntimacy,
        Scalar::LoveCare,
        Scalar::AngerIrritation,
        Scalar::AngerRage,
        Scalar::AngerResentment,
        Scalar::AngerInjustice,
    ];

    /// Hormones that relax toward the 0.5 baseline during decay.
    pub const BASELINE: [Scalar; 8] = [
        Scalar::Dopamine,
        Scalar::Cortisol,
        Scalar::Oxytocin,
        Scalar::Serotonin,
        Scalar::Adrenaline,
        Scalar::Testosterone,
        Scalar::Estrogen,
        Scalar::Amygdala,
    ];

    /// Scalars damped by the regulation pass.
    pub const PRIMARY: [Scalar; 8] = [
        Scalar::Dopamine,
        Scalar::Cortisol,
        Scalar::Oxytocin,
        Scalar::Serotonin,
        Scalar::Adrenaline,
        Scalar::Testosterone,
        Scalar::Amygdala,
        Scalar::Loneliness,
    ];

    pub const ANGER: [Scalar; 4] = [
        Scalar::AngerIrritation,
        Scalar::AngerRage,
        Scalar::AngerResentment,
        Scalar::AngerInjustice,
    ];

    /// Scalars that receive per-turn ambient noise.
    pub const DRIFT: [Scalar; 8] = [
        Scalar::Dopamine,
        Scalar::Cortisol,
        Scalar::Oxytocin,
        Scalar::Serotonin,
        Scalar::Adrenaline,
        Scalar::Testosterone,
        Scalar::AngerIrritation,
        Scalar::AngerResentment,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scalar::Dopamine => "dopamine",
            Scalar::Cortisol => "cortisol",
            Scalar::Oxytocin => "oxytocin",
            Scalar::Serotonin => "serotonin",
            Scalar::Adrenaline => "adrenaline",
            Scalar::Melatonin => "melatonin",
            Scalar::Testosterone => "testosterone",
            Scalar::Estrogen => "estrogen",
            Scalar::Lh => "lh",
            Scalar::Loneliness => "loneliness",
            Scalar::Curiosity => "curiosity",
            Scalar::Amygdala => "amygdala",
            Scalar::Hippocampus => "hippocampus",
            Scalar::LoveAttachment => "love_attachment",
            Scalar::LoveTrust => "love_trust",
            Scalar::LoveIntimacy => "love_intimacy",
            Scalar::LoveCare => "love_care",
            Scalar::AngerIrritation => "anger_irritation",
            Scalar::AngerRage => "anger_rage",
            Scalar::AngerResentment => "anger_resentment",
            Scalar::AngerInjustice => "anger_injustice",
        }
    }

    /// One-line explanation shown in hormone change reports.
    pub fn explanation(self) -> &'static str {
        match self {
            Scalar::Dopamine => "reward and motivation",
            Scalar::Cortisol => "stress hormone",
            Scalar::Oxytocin => "bonding and trust",
            Scalar::Serotonin => "mood stability",
            Scalar::Adrenaline => "alertness, fight-or-flight",
            Scalar::Melatonin => "rest and sleepiness",
            Scalar::Testosterone => "confidence and drive",
            Scalar::Estrogen => "emotional sensitivity",
            Scalar::Lh => "hormonal balance",
            Scalar::Loneliness => "feeling of isolation",
            Scalar::Curiosity => "drive to explore",
            Scalar::Amygdala => "threat detection, fear",
            Scalar::Hippocampus => "memory formation",
            Scalar::LoveAttachment => "emotional closeness",
            Scalar::LoveTrust => "trust in the other person",
            Scalar::LoveIntimacy => "sense of intimacy",
            Scalar::LoveCare => "care for the other person",
            Scalar::AngerIrritation => "annoyance",
            Scalar::AngerRage => "intense anger",
            Scalar::AngerResentment => "lingering grudge",
            Scalar::AngerInjustice => "sense of unfairness",
        }
    }

    fn default_value(self) -> f32 {
        match self {
            Scalar::Dopamine => 0.5,
            Scalar::Cortisol => 0.2,
            Scalar::Oxytocin => 0.5,
            Scalar::Serotonin => 0.5,
            Scalar::Adrenaline => 0.1,
            Scalar::Melatonin => 0.3,
            Scalar::Testosterone => 0.5,
            Scalar::Estrogen => 0.5,
            Scalar::Lh => 0.5,
            Scalar::Loneliness => 0.3,
            Scalar::Curiosity => 0.6,
            Scalar::Amygdala => 0.2,
            Scalar::Hippocampus => 0.5,
            Scalar::LoveAttachment => 0.0,
            Scalar::LoveTrust => 0.5,
            Scalar::LoveIntimacy => 0.0,
            Scalar::LoveCare => 0.5,
            Scalar::AngerIrritation
            | Scalar::AngerRage
            | Scalar::AngerResentment
            | Scalar::AngerInjustice => 0.0,
        }
    }
}

/// Hormones, brain-structure analogues and relational sub-emotions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionalState {
    pub dopamine: f32,
    pub cortisol: f32,
    pub oxytocin: f32,
    pub serotonin: f32,
    pub adrenaline: f32,
    pub melatonin: f32,
    pub testosterone: f32,
    pub estrogen: f32,
    pub lh: f32,
    pub loneliness: f32,
    pub curiosity: f32,
    pub amygdala: f32,
    pub hippocampus: f32,
    pub love_attachment: f32,
    pub love_trust: f32,
    pub love_intimacy: f32,
    pub love_care: f32,
    pub anger_irritation: f32,
    pub anger_rage: f32,
    pub anger_resentment: f32,
    pub anger_injustice: f32,
}

impl Default for EmotionalState {
    fn default() -> Self {
        let mut s = Self {
            dopamine: 0.0,
            cortisol: 0.0,
            oxytocin: 0.0,
            serotonin: 0.0,
            adrenaline: 0.0,
            melatonin: 0.0,
            testosterone: 0.0,
            estrogen: 0.0,
            lh: 0.0,
            loneliness: 0.0,
            curiosity: 0.0,
            amygdala: 0.0,
            hippocampus: 0.0,
            love_attachment: 0.0,
            love_trust: 0.0,
            love_intimacy: 0.0,
            love_care: 0.0,
            anger_irritation: 0.0,
            anger_rage: 0.0,
            anger_resentment: 0.0,
            anger_injustice: 0.0,
        };
        for scalar in Scalar::ALL {
            s.set(scalar, scalar.default_value());
        }
        s
    }
}

impl EmotionalState {
    pub fn get(&self, scalar: Scalar) -> f32 {
        match scalar {
            Scalar::Dopamine => self.dopamine,
            Scalar::Cortisol => self.cortisol,
            Scalar::Oxytocin => self.oxytocin,
            Scalar::Serotonin => self.serotonin,
            Scalar::Adrenaline => self.adrenaline,
            Scalar::Melatonin => self.melatonin,
            Scalar::Testosterone => self.testosterone,
            Scalar::Estrogen => self.estrogen,
            Scalar::Lh => self.lh,
            Scalar::Loneliness => self.loneliness,
            Scalar::Curiosity => self.curiosity,
            Scalar::Amygdala => self.amygdala,
            Scalar::Hippocampus => self.hippocampus,
            Scalar::LoveAttachment => self.love_attachment,
            Scalar::LoveTrust => self.love_trust,
            Scalar::LoveIntimacy => self.love_intimacy,
            Scalar::LoveCare => self.love_care,
            Scalar::AngerIrritation => self.anger_irritation,
            Scalar::AngerRage => self.anger_rage,
            Scalar::AngerResentment => self.anger_resentment,
            Scalar::AngerInjustice => self.anger_injustice,
        }
    }

    pub fn get_mut(&mut self, scalar: Scalar) -> &mut f32 {
        match scalar {
            Scalar::Dopamine => &mut self.dopamine,
            Scalar::Cortisol => &mut self.cortisol,
            Scalar::Oxytocin => &mut self.oxytocin,
            Scalar::Serotonin => &mut self.serotonin,
            Scalar::Adrenaline => &mut self.adrenaline,
            Scalar::Melatonin => &mut self.melatonin,
            Scalar::Testosterone => &mut self.testosterone,
            Scalar::Estrogen => &mut self.estrogen,
            Scalar::Lh => &mut self.lh,
            Scalar::Loneliness => &mut self.loneliness,
            Scalar::Curiosity => &mut self.curiosity,
            Scalar::Amygdala => &mut self.amygdala,
            Scalar::Hippocampus => &mut self.hippocampus,
            Scalar::LoveAttachment => &mut self.love_attachment,
            Scalar::LoveTrust => &mut self.love_trust,
            Scalar::LoveIntimacy => &mut self.love_intimacy,
            Scalar::LoveCare => &mut self.love_care,
            Scalar::AngerIrritation => &mut self.anger_irritation,
            Scalar::AngerRage => &mut self.anger_rage,
            Scalar::AngerResentment => &mut self.anger_resentment,
            Scalar::AngerInjustice => &mut self.anger_injustice,
        }
    }

    pub fn set(&mut self, scalar: Scalar, value: f32) {
        *self.get_mut(scalar) = value;
    }

    /// Add `delta` without clamping. Callers clamp once the whole update is applied.
    pub fn nudge(&mut self, scalar: Scalar, delta: f32) {
        *self.get_mut(scalar) += delta;
    }

    /// Clamp every field into [0, 1], then apply the hard oxytocin and
    /// attachment caps. Non-finite values fall back to the field default.
    pub fn clamp(&mut self, limits: &EmotionConfig) {
        for scalar in Scalar::ALL {
            let v = self.get_mut(scalar);
            *v = sanitize_f32(*v, scalar.default_value()).clamp(0.0, 1.0);
        }
        self.oxytocin = self.oxytocin.min(limits.oxytocin_cap);
        self.love_attachment = self.love_attachment.min(limits.attachment_cap);
    }

    /// True when every scalar is finite and within [0, 1].
    pub fn is_bounded(&self) -> bool {
        Scalar::ALL
            .iter()
            .all(|s| (0.0..=1.0).contains(&self.get(*s)))
    }

    /// Derive the 9-dimensional emotion vector. Never stored.
    pub fn to_emotion_vector(&self) -> EmotionVector {
        EmotionVector::from_state(self)
    }

    /// Scalars that moved by at least `threshold` between `before` and `self`.
    pub fn changes_since(&self, before: &EmotionalState, threshold: f32) -> Vec<HormoneChange> {
        Scalar::ALL
            .iter()
            .filter_map(|&scalar| {
                let old = before.get(scalar);
                let new = self.get(scalar);
                let delta = new - old;
                if delta.abs() < threshold {
                    return None;
                }
                Some(HormoneChange {
                    scalar,
                    before: round2(old),
                    after: round2(new),
                    delta: round2(delta),
                    rising: delta > 0.0,
                    explanation: scalar.explanation(),
                })
            })
            .collect()
    }
}

/// One entry of a hormone change report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HormoneChange {
    pub scalar: Scalar,
    pub before: f32,
    pub after: f32,
    pub delta: f32,
    pub rising: bool,
    pub explanation: &'static str,
}

impl HormoneChange {
    pub fn describe(&self) -> String {
        format!(
            "{} {} {:.2} -> {:.2} ({})",
            self.scalar.name(),
            if self.rising { "up" } else { "down" },
            self.before,
            self.after,
            self.explanation
        )
    }
}

pub(crate) fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_table() {
        let s = EmotionalState::default();
        assert_eq!(s.dopamine, 0.5);
        assert_eq!(s.cortisol, 0.2);
        assert_eq!(s.adrenaline, 0.1);
        assert_eq!(s.curiosity, 0.6);
        assert_eq!(s.love_attachment, 0.0);
        assert_eq!(s.anger_rage, 0.0);
        assert!(s.is_bounded());
    }

    #[test]
    fn test_accessors_cover_every_field() {
        let mut s = EmotionalState::default();
        for (i, scalar) in Scalar::ALL.iter().enumerate() {
            s.set(*scalar, i as f32 / 100.0);
        }
        for (i, scalar) in Scalar::ALL.iter().enumerate() {
            assert_eq!(s.get(*scalar), i as f32 / 100.0, "{}", scalar.name());
        }
    }

    #[test]
    fn test_clamp_applies_caps_and_nan_guard() {
        let limits = EmotionConfig::default();
        let mut s = EmotionalState::default();
        s.oxytocin = 0.95;
        s.love_attachment = 0.9;
        s.cortisol = 3.0;
        s.dopamine = -1.0;
        s.serotonin = f32::NAN;
        s.clamp(&limits);
        assert_eq!(s.oxytocin, 0.8);
        assert_eq!(s.love_attachment, 0.4);
        assert_eq!(s.cortisol, 1.0);
        assert_eq!(s.dopamine, 0.0);
        assert_eq!(s.serotonin, 0.5);
        assert!(s.is_bounded());
    }

    #[test]
    fn test_changes_since_threshold() {
        let before = EmotionalState::default();
        let mut after = before.clone();
        after.cortisol += 0.1;
        after.dopamine -= 0.01;
        let changes = after.changes_since(&before, 0.02);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].scalar, Scalar::Cortisol);
        assert!(changes[0].rising);
        assert!(changes[0].describe().starts_with("cortisol up"));
    }
}
