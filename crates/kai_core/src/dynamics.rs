//! Emotion Engine: event rules, decay and self-regulation.
//!
//! Every public mutation ends with a clamp, so no caller ever observes a
//! scalar outside [0, 1] or above its hard cap.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::EmotionConfig;
use crate::emotion::EmotionVector;
use crate::state::{EmotionalState, HormoneChange, Scalar};

/// Changes smaller than this are left out of hormone change reports.
pub const REPORT_THRESHOLD: f32 = 0.02;

/// Event kinds understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Success,
    Rejection,
    Praise,
    Criticism,
    Bonding,
    Loss,
    Betrayal,
    Deadline,
    Lonely,
    Rest,
    Creative,
    Injustice,
    Insult,
    PersonalSharing,
    Apology,
    BoundaryPush,
    Info,
    Neutral,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Success => "success",
            EventKind::Rejection => "rejection",
            EventKind::Praise => "praise",
            EventKind::Criticism => "criticism",
            EventKind::Bonding => "bonding",
            EventKind::Loss => "loss",
            EventKind::Betrayal => "betrayal",
            EventKind::Deadline => "deadline",
            EventKind::Lonely => "lonely",
            EventKind::Rest => "rest",
            EventKind::Creative => "creative",
            EventKind::Injustice => "injustice",
            EventKind::Insult => "insult",
            EventKind::PersonalSharing => "personal_sharing",
            EventKind::Apology => "apology",
            EventKind::BoundaryPush => "boundary_push",
            EventKind::Info => "info",
            EventKind::Neutral => "neutral",
        }
    }

    /// Additive deltas, scaled by intensity when applied.
    fn deltas(self) -> &'static [(Scalar, f32)] {
        use Scalar::*;
        match self {
            EventKind::Success => &[
                (Dopamine, 0.3),
                (Cortisol, -0.2),
                (Testosterone, 0.1),
                (Serotonin, 0.1),
            ],
            EventKind::Rejection => &[
                (Dopamine, -0.3),
                (Cortisol, 0.4),
                (Amygdala, 0.3),
                (Loneliness, 0.2),
                (Testosterone, -0.2),
            ],
            EventKind::Praise => &[(Dopamine, 0.25), (Oxytocin, 0.1), (LoveTrust, 0.05)],
            EventKind::Criticism => &[(Cortisol, 0.3), (Amygdala, 0.2), (LoveTrust, -0.1)],
            EventKind::Bonding => &[
                (Oxytocin, 0.3),
                (LoveAttachment, 0.2),
                (Loneliness, -0.3),
                (Serotonin, 0.1),
            ],
            EventKind::Loss => &[
                (Cortisol, 0.4),
                (Oxytocin, -0.2),
                (Loneliness, 0.4),
                (LoveAttachment, -0.2),
            ],
            EventKind::Betrayal => &[
                (AngerRage, 0.4),
                (AngerInjustice, 0.5),
                (LoveTrust, -0.5),
                (Amygdala, 0.3),
            ],
            EventKind::Deadline => &[(Adrenaline, 0.4), (Cortisol, 0.3)],
            EventKind::Lonely => &[(Loneliness, 0.3), (Serotonin, -0.2)],
            EventKind::Rest => &[(Melatonin, 0.2), (Cortisol, -0.2), (Adrenaline, -0.3)],
            EventKind::Creative => &[(Dopamine, 0.15), (Curiosity, 0.2)],
            EventKind::Injustice => &[(AngerInjustice, 0.5), (AngerResentment, 0.3)],
            EventKind::Insult => &[
                (Cortisol, 0.08),
                (Amygdala, 0.05),
                (Testosterone, -0.02),
                (AngerIrritation, 0.05),
                (AngerResentment, 0.03),
            ],
            EventKind::PersonalSharing => &[(Dopamine, 0.02), (Oxytocin, 0.02)],
            EventKind::Apology => &[
                (Cortisol, -0.1),
                (Oxytocin, 0.15),
                (LoveTrust, 0.05),
                (AngerIrritation, -0.1),
            ],
            EventKind::BoundaryPush => &[
                (AngerIrritation, 0.12),
                (AngerResentment, 0.05),
                (Cortisol, 0.05),
            ],
            EventKind::Info => &[(Dopamine, 0.02), (Cortisol, -0.01), (Amygdala, -0.01)],
            EventKind::Neutral => &[],
        }
    }
}

impl From<&str> for EventKind {
    /// Unknown names map to [`EventKind::Neutral`].
    fn from(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "success" => EventKind::Success,
            "rejection" => EventKind::Rejection,
            "praise" => EventKind::Praise,
            "criticism" => EventKind::Criticism,
            "bonding" => EventKind::Bonding,
            "loss" => EventKind::Loss,
            "betrayal" => EventKind::Betrayal,
            "deadline" => EventKind::Deadline,
            "lonely" => EventKind::Lonely,
            "rest" => EventKind::Rest,
            "creative" => EventKind::Creative,
            "injustice" => EventKind::Injustice,
            "insult" => EventKind::Insult,
            "personal_sharing" => EventKind::PersonalSharing,
            "apology" => EventKind::Apology,
            "boundary_push" => EventKind::BoundaryPush,
            "info" => EventKind::Info,
            _ => EventKind::Neutral,
        }
    }
}

/// Owns the emotional state and every rule that mutates it.
#[derive(Debug, Clone)]
pub struct EmotionEngine {
    state: EmotionalState,
    limits: EmotionConfig,
}

impl EmotionEngine {
    pub fn new(limits: EmotionConfig) -> Self {
        Self::with_state(EmotionalState::default(), limits)
    }

    pub fn with_state(mut state: EmotionalState, limits: EmotionConfig) -> Self {
        state.clamp(&limits);
        Self { state, limits }
    }

    pub fn state(&self) -> &EmotionalState {
        &self.state
    }

    pub fn limits(&self) -> &EmotionConfig {
        &self.limits
    }

    pub fn emotion_vector(&self) -> EmotionVector {
        self.state.to_emotion_vector()
    }

    /// Apply an event's deltas scaled by `intensity` (clamped to [0, 1]).
    /// Neutral events fall back to a small decay step.
    pub fn process_event(&mut self, kind: EventKind, intensity: f32) -> &EmotionalState {
        let intensity = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if kind == EventKind::Neutral {
            self.decay(0.01);
            return &self.state;
        }
        for &(scalar, delta) in kind.deltas() {
            self.state.nudge(scalar, delta * intensity);
        }
        self.state.clamp(&self.limits);
        tracing::trace!("event {} @ {:.2} applied", kind.as_str(), intensity);
        &self.state
    }

    /// Relax hormones toward 0.5, let loneliness creep up and anger cool off.
    pub fn decay(&mut self, rate: f32) {
        for scalar in Scalar::BASELINE {
            let v = self.state.get(scalar);
            self.state.set(scalar, v + (0.5 - v) * rate);
        }
        self.state.nudge(Scalar::Loneliness, 0.01);
        for scalar in Scalar::ANGER {
            let v = self.state.get(scalar);
            self.state.set(scalar, (v - rate * 0.5).max(0.0));
        }
        self.state.clamp(&self.limits);
    }

    /// Daily decay step.
    pub fn tick(&mut self) {
        self.decay(self.limits.daily_decay_rate);
    }

    /// Multiplicative oxytocin decay applied once per turn.
    pub fn per_turn_attachment_decay(&mut self) {
        self.state.oxytocin *= self.limits.attachment_decay;
        self.state.clamp(&self.limits);
    }

    /// Self-regulation pass. Runs exactly once per turn, after event
    /// processing and before the state is read for a reply.
    pub fn regulate(&mut self) {
        let s = &mut self.state;

        for scalar in Scalar::PRIMARY {
            *s.get_mut(scalar) *= 0.95;
        }

        for scalar in Scalar::ANGER {
            let v = s.get_mut(scalar);
            if *v > 0.4 {
                *v -= 0.05;
            }
        }

        let sadness = 0.5 * s.loneliness + 0.5 * s.cortisol;
        if (s.loneliness > 0.6 || s.cortisol > 0.6) && sadness > 0.6 {
            s.loneliness = (s.loneliness - 0.05).max(0.2);
            s.cortisol = (s.cortisol - 0.05).max(0.1);
            s.serotonin += 0.03;
        }

        self.enforce_limits();
    }

    /// Ceilings first, then direct floors, then the derived joy/hope floors
    /// which are met by raising their inputs.
    fn enforce_limits(&mut self) {
        let l = &self.limits;
        let s = &mut self.state;

        s.clamp(l);
        s.cortisol = s.cortisol.min(l.cortisol_ceiling);
        s.amygdala = s.amygdala.min(l.amygdala_ceiling);
        s.loneliness = s.loneliness.min(l.loneliness_ceiling);

        s.dopamine = s.dopamine.max(l.dopamine_floor);
        s.serotonin = s.serotonin.max(l.serotonin_floor);
        s.testosterone = s.testosterone.max(l.testosterone_floor);

        lift_through_cortisol(s, Scalar::Dopamine, l.joy_floor);
        lift_through_cortisol(s, Scalar::Serotonin, l.hope_floor);

        s.clamp(l);
    }

    /// Uniform noise of `±micro_drift` on the drift subset, then clamp.
    pub fn micro_drift<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let d = self.limits.micro_drift;
        if d <= 0.0 {
            return;
        }
        for scalar in Scalar::DRIFT {
            self.state.nudge(scalar, rng.gen_range(-d..=d));
        }
        self.state.clamp(&self.limits);
    }

    /// Direct adjustment used by the orchestrator (oxytocin gain, secure
    /// attachment, coping nudges). Always re-clamps.
    pub fn adjust(&mut self, changes: &[(Scalar, f32)]) {
        for &(scalar, delta) in changes {
            self.state.nudge(scalar, delta);
        }
        self.state.clamp(&self.limits);
    }

    /// Blend the social ledger's loneliness factor into the loneliness scalar.
    pub fn blend_loneliness(&mut self, factor: f32, smoothing: f32) {
        let s = smoothing.clamp(0.0, 1.0);
        self.state.loneliness = s * self.state.loneliness + (1.0 - s) * factor;
        self.state.clamp(&self.limits);
    }

    pub fn clamp(&mut self) {
        self.state.clamp(&self.limits);
    }

    pub fn changes_since(&self, before: &EmotionalState) -> Vec<HormoneChange> {
        self.state.changes_since(before, REPORT_THRESHOLD)
    }
}

/// Ensure `hormone · (1 − cortisol) ≥ floor`. Raises the hormone first;
/// if that saturates, lowers cortisol to `1 − floor`.
fn lift_through_cortisol(s: &mut EmotionalState, hormone: Scalar, floor: f32) {
    let headroom = 1.0 - s.cortisol;
    if s.get(hormone) * headroom >= floor {
        return;
    }
    if headroom > floor {
        s.set(hormone, (floor / headroom).min(1.0));
    } else {
        s.set(hormone, 1.0);
        s.cortisol = (1.0 - floor).max(0.0);
    }
}
