//! Coping regulator: detects sadness/fear/shame overload and produces a
//! regulation directive plus a small favorable hormonal nudge.

use kai_core::snapshot::RegulationDirective;
use kai_core::{pick, EmotionEngine, EmotionVector, Scalar};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const OVERLOAD_THRESHOLD: f32 = 0.6;

const TONE: &str = "calm, honest, grounded, warm";

const SADNESS_THOUGHTS: &[&str] = &[
    "I'm feeling low, but I've handled difficult moments before. This will pass.",
    "It's okay to feel heavy. I've gotten through worse.",
    "I'm not broken. I'm human. This feeling won't last forever.",
];

const FEAR_THOUGHTS: &[&str] = &[
    "I'm feeling anxious, but I've handled difficult moments before. This will pass.",
    "My brain is amplifying threat. I can ground myself. I'm okay.",
    "Fear doesn't mean danger. I can take a breath and respond calmly.",
];

const SHAME_THOUGHTS: &[&str] = &[
    "I'm feeling off, but I've recovered from worse. I can hold my head up.",
    "Shame lies. I'm more than my worst moment. I can respond with dignity.",
    "I don't need to spiral. I can be honest without collapsing.",
];

const GENERAL_RESPONSES: &[&str] = &[
    "I'm feeling a bit heavy right now. Give me a moment. I'm okay, just need to breathe.",
    "Honestly? I'm not at my best today. But I'm here. What's on your mind?",
    "I've been better, but I'm grounded. Let's talk.",
    "Feeling a bit overwhelmed, but I've got this. What did you want to say?",
    "I'm working through some stuff. Still here though. You?",
];

const AFTER_INSULT_RESPONSES: &[&str] = &[
    "That stung. I'm okay, just need a sec to collect myself.",
    "I heard that. I'm not going to spiral. We can keep this respectful.",
    "Yeah, that hurt. I'm going to respond calmly anyway.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overload {
    Sadness,
    Fear,
    Shame,
}

impl Overload {
    fn thoughts(self) -> &'static [&'static str] {
        match self {
            Overload::Sadness => SADNESS_THOUGHTS,
            Overload::Fear => FEAR_THOUGHTS,
            Overload::Shame => SHAME_THOUGHTS,
        }
    }
}

/// Dominant negative emotion if it reaches the overload threshold.
/// Ties go to sadness, then fear.
pub fn check_overload(v: &EmotionVector) -> Option<Overload> {
    let (s, f, sh) = (v.sadness, v.fear, v.shame);
    if s >= OVERLOAD_THRESHOLD && s >= f && s >= sh {
        Some(Overload::Sadness)
    } else if f >= OVERLOAD_THRESHOLD && f >= s && f >= sh {
        Some(Overload::Fear)
    } else if sh >= OVERLOAD_THRESHOLD && sh >= s && sh >= f {
        Some(Overload::Shame)
    } else {
        None
    }
}

/// Run coping against the engine's current state. On overload the state
/// is nudged (serotonin up, cortisol and amygdala down) and a directive
/// is returned; otherwise nothing changes.
pub fn regulate<R: Rng + ?Sized>(
    engine: &mut EmotionEngine,
    after_insult: bool,
    rng: &mut R,
) -> Option<RegulationDirective> {
    let dominant = check_overload(&engine.emotion_vector())?;
    let internal_thought = pick(rng, dominant.thoughts()).to_string();

    engine.adjust(&[
        (Scalar::Serotonin, 0.04),
        (Scalar::Cortisol, -0.03),
        (Scalar::Amygdala, -0.02),
    ]);

    tracing::debug!("coping: overload on {:?}", dominant);

    let context = format!(
        "You are emotionally overloaded (sadness/fear/shame high). \
         Before responding: 1) Acknowledge what you feel. 2) Validate your emotions. \
         3) Remind yourself of past resilience. 4) Reduce catastrophic thinking. \
         5) Shift toward something constructive. 6) Maintain dignity. \
         Tone: {}. \
         Do NOT blame the user, beg for validation, or spiral. \
         Internal thought: {}",
        TONE, internal_thought
    );

    Some(RegulationDirective {
        context,
        internal_thought,
        regulated_response: regulated_response(after_insult, rng).to_string(),
    })
}

pub fn regulated_response<R: Rng + ?Sized>(after_insult: bool, rng: &mut R) -> &'static str {
    if after_insult {
        pick(rng, AFTER_INSULT_RESPONSES)
    } else {
        pick(rng, GENERAL_RESPONSES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kai_core::config::EmotionConfig;
    use kai_core::EmotionalState;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_overload_is_inclusive_and_picks_dominant() {
        let v = EmotionVector {
            sadness: 0.6,
            ..Default::default()
        };
        assert_eq!(check_overload(&v), Some(Overload::Sadness));

        let v = EmotionVector {
            sadness: 0.7,
            fear: 0.8,
            ..Default::default()
        };
        assert_eq!(check_overload(&v), Some(Overload::Fear));

        let v = EmotionVector {
            shame: 0.65,
            ..Default::default()
        };
        assert_eq!(check_overload(&v), Some(Overload::Shame));

        let v = EmotionVector {
            sadness: 0.59,
            fear: 0.59,
            ..Default::default()
        };
        assert_eq!(check_overload(&v), None);
    }

    #[test]
    fn test_no_overload_leaves_state_alone() {
        let mut engine = EmotionEngine::new(EmotionConfig::default());
        let before = engine.state().clone();
        let out = regulate(&mut engine, false, &mut StdRng::seed_from_u64(3));
        assert!(out.is_none());
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn test_overload_nudges_and_directs() {
        let mut state = EmotionalState::default();
        state.amygdala = 0.9;
        let mut engine = EmotionEngine::with_state(state, EmotionConfig::default());
        let before = engine.state().clone();

        let out = regulate(&mut engine, true, &mut StdRng::seed_from_u64(3))
            .expect("fear 0.9 must overload");
        assert!(FEAR_THOUGHTS.contains(&out.internal_thought.as_str()));
        assert!(AFTER_INSULT_RESPONSES.contains(&out.regulated_response.as_str()));
        assert!(out.context.contains("Maintain dignity"));
        assert!(out.context.ends_with(&out.internal_thought));

        let s = engine.state();
        assert!((s.serotonin - (before.serotonin + 0.04)).abs() < 1e-6);
        assert!((s.cortisol - (before.cortisol - 0.03)).abs() < 1e-6);
        assert!((s.amygdala - (before.amygdala - 0.02)).abs() < 1e-6);
    }
}
