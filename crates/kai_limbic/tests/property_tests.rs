//! Property-based tests for the boundary state machine and wellbeing index.
//!
//! Drives the boundary engine with arbitrary interleavings of insults,
//! positive turns and disengage steps and checks the flag invariants.

use kai_core::config::BoundaryConfig;
use kai_core::EmotionVector;
use kai_limbic::{BoundaryEngine, MentalHealth};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Abuse(usize),
    Positive,
    Step,
}

const WORDS: [&str; 4] = ["stupid", "idiot", "dumb", "trash"];

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..WORDS.len()).prop_map(Op::Abuse),
        Just(Op::Positive),
        Just(Op::Step),
    ]
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

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn boundary_flags_stay_consistent(ops in prop::collection::vec(arb_op(), 0..200)) {
        let config = BoundaryConfig::default();
        let mut b = BoundaryEngine::new(config.clone());
        for op in ops {
            match op {
                Op::Abuse(i) => b.record_abuse(Some(WORDS[i])),
                Op::Positive => b.record_positive(),
                Op::Step => b.step_disengage(),
            }
            let s = b.state();
            prop_assert!(s.history.len() <= 20);
            prop_assert!(s.disengaged_left <= config.disengage_for);
            prop_assert!(s.positive_streak < config.recovery_reset_after);
            if s.abuse_count >= config.abuse_threshold {
                prop_assert!(s.defense_mode);
            }
            if s.cooldown {
                prop_assert!(s.defense_mode);
            }
        }
    }

    #[test]
    fn insults_raise_count_by_exactly_one(n in 1u32..50) {
        let mut b = BoundaryEngine::new(BoundaryConfig::default());
        for _ in 0..n {
            b.record_abuse(Some("dumb"));
        }
        prop_assert_eq!(b.abuse_count(), n);
    }

    #[test]
    fn wellbeing_index_bounded(updates in prop::collection::vec(arb_emotions(), 1..40)) {
        let mut m = MentalHealth::new();
        for v in updates {
            m.update_from_emotions(&v);
            m.check_healing_mode();
            m.check_self_soothing(&v);
            let o = m.index.overall();
            prop_assert!((0.0..=1.0 + 1e-6).contains(&o));
            prop_assert!((0.0..=1.0).contains(&m.index.stress));
        }
    }
}
