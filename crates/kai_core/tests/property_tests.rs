//! Property-based tests for kai_core.
//!
//! Uses proptest to verify the range invariants of the emotion engine hold
//! for arbitrary states, events and intensities.

use kai_core::config::{EmotionConfig, PersonalityConfig};
use kai_core::{
    EmotionEngine, EmotionVector, EmotionalState, EventKind, PersonalityAdapter, Scalar,
};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

const EVENTS: [EventKind; 18] = [
    EventKind::Success,
    EventKind::Rejection,
    EventKind::Praise,
    EventKind::Criticism,
    EventKind::Bonding,
    EventKind::Loss,
    EventKind::Betrayal,
    EventKind::Deadline,
    EventKind::Lonely,
    EventKind::Rest,
    EventKind::Creative,
    EventKind::Injustice,
    EventKind::Insult,
    EventKind::PersonalSharing,
    EventKind::Apology,
    EventKind::BoundaryPush,
    EventKind::Info,
    EventKind::Neutral,
];

fn arb_event() -> impl Strategy<Value = EventKind> {
    (0..EVENTS.len()).prop_map(|i| EVENTS[i])
}

/// Arbitrary state, including values outside [0, 1] that the engine must repair.
fn arb_state() -> impl Strategy<Value = EmotionalState> {
    prop::collection::vec(-1.0f32..=2.0, Scalar::ALL.len()).prop_map(|vals| {
        let mut s = EmotionalState::default();
        for (scalar, v) in Scalar::ALL.iter().zip(vals) {
            s.set(*scalar, v);
        }
        s
    })
}

fn arb_emotions() -> impl Strategy<Value = EmotionVector> {
    prop::collection::vec(0.0f32..=1.0, 9).prop_map(|v| EmotionVector {
        joy: v[0],
        sadness: v[1],
        anger: v[2],
        fear: v[3],
        love: v[4],
        shame: v[5],
        pride: v[6],
        hope: v[7],
        loneliness: v[8],
    })
}

fn assert_vector_bounded(v: &EmotionVector) {
    for x in v.values() {
        assert!((0.0..=1.0).contains(&x), "emotion out of range: {:?}", v);
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn events_keep_state_bounded(
        state in arb_state(),
        events in prop::collection::vec((arb_event(), -1.0f32..=3.0), 1..30),
    ) {
        let limits = EmotionConfig::default();
        let mut engine = EmotionEngine::with_state(state, limits.clone());
        for (kind, intensity) in events {
            engine.process_event(kind, intensity);
            prop_assert!(engine.state().is_bounded());
            prop_assert!(engine.state().oxytocin <= limits.oxytocin_cap);
            prop_assert!(engine.state().love_attachment <= limits.attachment_cap);
            assert_vector_bounded(&engine.emotion_vector());
        }
    }

    #[test]
    fn regulate_enforces_floors_and_ceilings(state in arb_state(), event in arb_event()) {
        let limits = EmotionConfig::default();
        let mut engine = EmotionEngine::with_state(state, limits.clone());
        engine.process_event(event, 1.0);
        engine.regulate();

        let s = engine.state();
        let v = engine.emotion_vector();
        prop_assert!(s.is_bounded());
        prop_assert!(s.cortisol <= limits.cortisol_ceiling + 1e-6);
        prop_assert!(s.amygdala <= limits.amygdala_ceiling + 1e-6);
        prop_assert!(s.loneliness <= limits.loneliness_ceiling + 1e-6);
        prop_assert!(s.dopamine >= limits.dopamine_floor - 1e-6);
        prop_assert!(s.serotonin >= limits.serotonin_floor - 1e-6);
        prop_assert!(s.testosterone >= limits.testosterone_floor - 1e-6);
        prop_assert!(v.hope >= limits.hope_floor - 1e-4, "hope {}", v.hope);
        prop_assert!(v.joy >= limits.joy_floor - 1e-4, "joy {}", v.joy);
    }

    #[test]
    fn decay_and_drift_keep_state_bounded(state in arb_state(), rate in 0.0f32..=1.0, seed in any::<u64>()) {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let mut engine = EmotionEngine::with_state(state, EmotionConfig::default());
        engine.decay(rate);
        prop_assert!(engine.state().is_bounded());
        engine.per_turn_attachment_decay();
        engine.micro_drift(&mut rng);
        prop_assert!(engine.state().is_bounded());
    }

    #[test]
    fn personality_traits_stay_in_range(
        updates in prop::collection::vec((arb_emotions(), 0.0f32..=1.0), 1..50),
    ) {
        let mut adapter = PersonalityAdapter::new(PersonalityConfig::default());
        for (emotions, weight) in updates {
            adapter.update_from_memory(&emotions, weight);
        }
        let t = &adapter.state().traits;
        for v in [t.confidence, t.optimism, t.resilience, t.empathy, t.independence, t.discipline, t.curiosity, t.trustfulness] {
            prop_assert!((0.0..=1.0).contains(&v));
        }
    }
}
