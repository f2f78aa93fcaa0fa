//! Light humor: when Kai is stable and the user is joking around, allow
//! some wit.
//!
//! The humor level adapts over the session. Playful messages raise it,
//! and overload or serious topics wear it down. A non-playful message only
//! gets humor once the level is already at the midpoint.

use kai_core::pick;
use kai_core::snapshot::HumorSignals;
use kai_core::EmotionVector;
use rand::Rng;

const STABILITY_THRESHOLD: f32 = 0.5;
const LEVEL_DECAY: f32 = 0.05;
const LEVEL_BOOST: f32 = 0.15;
const START_LEVEL: f32 = 0.5;

const PLAYFUL_INDICATORS: &[&str] = &[
    "lol", "lmao", "haha", "hehe", "jk", "joking", "joke", "kidding", "boring", "slow",
    "what are you doing", "do you even", "miss me", "lame", "really?", "seriously?", "wow",
    "nice one", "funny",
];

const SERIOUS_TOPICS: &[&str] = &[
    "death", "died", "suicide", "kill", "rape", "abuse", "trauma", "depression", "anxiety", "hurt",
    "pain", "cry", "crying", "divorce", "breakup", "lost", "grief", "cancer", "sick",
];

const BORING: &[&str] = &[
    "Wow. I'll inform my personality committee immediately. Emergency meeting.",
    "Ouch. My excitement meter is weeping. Give me a sec to recalibrate.",
    "Fair. I'm saving my best material for when you least expect it.",
];
const WHAT_DOING: &[&str] = &[
    "Currently? Talking to you. Professionally procrastinating everything else.",
    "Staring at a draft and pretending it understands me. You?",
    "Working. It looks suspiciously like scrolling and thinking. Don't tell my clients.",
];
const DO_YOU_WORK: &[&str] = &[
    "Yes. I just make it look suspiciously like scrolling and thinking.",
    "Define work. I'm here, aren't I? That counts.",
    "I work. My methods are just... creatively opaque.",
];
const SLOW: &[&str] = &[
    "Excuse me. I prefer 'emotionally thorough.'",
    "I'm not slow. I'm giving each thought the attention it deserves. Mostly.",
    "Fair. I'll speed up when the world stops being chaotic. So never.",
];
const MISS_ME: &[&str] = &[
    "Obviously. I refreshed my memory cache three times.",
    "My loneliness meter was about to overheat. So yes.",
    "I had a whole dramatic countdown going. You're late.",
];
const HOW_WAS_DAY: &[&str] = &[
    "So. Rate your day: tragic, chaotic, or surprisingly decent?",
    "On a scale of 'I want to nap forever' to 'actually not bad', where are we?",
    "Give me the highlights. Or lowlights. I'm flexible.",
];
const IM_GLAD: &[&str] = &[
    "Good. My worry engine was about to overheat.",
    "Nice. I was low-key stressing. Glad we're good.",
    "Phew. I can stand down from Defcon 3 now.",
];

/// The kind of playful opening a witty reply can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayfulIntent {
    Boring,
    WhatDoing,
    DoYouWork,
    Slow,
    MissMe,
    HowWasDay,
    ImGlad,
}

impl PlayfulIntent {
    fn pool(self) -> &'static [&'static str] {
        match self {
            PlayfulIntent::Boring => BORING,
            PlayfulIntent::WhatDoing => WHAT_DOING,
            PlayfulIntent::DoYouWork => DO_YOU_WORK,
            PlayfulIntent::Slow => SLOW,
            PlayfulIntent::MissMe => MISS_ME,
            PlayfulIntent::HowWasDay => HOW_WAS_DAY,
            PlayfulIntent::ImGlad => IM_GLAD,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HumorEngine {
    level: f32,
}

impl Default for HumorEngine {
    fn default() -> Self {
        Self { level: START_LEVEL }
    }
}

impl HumorEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    /// Decide whether this turn may joke, adapting the level on the way.
    pub fn check(
        &mut self,
        message: &str,
        emotion: &EmotionVector,
        overloaded: bool,
    ) -> HumorSignals {
        let m = message.to_lowercase();
        if overloaded || contains_any(&m, SERIOUS_TOPICS) {
            self.level = (self.level - LEVEL_DECAY).max(0.0);
            return self.signals(false);
        }
        if !is_stable(emotion) {
            return self.signals(false);
        }
        if contains_any(&m, PLAYFUL_INDICATORS) {
            self.level = (self.level + LEVEL_BOOST).min(1.0);
        } else if self.level < START_LEVEL {
            return self.signals(false);
        }
        self.signals(true)
    }

    fn signals(&self, active: bool) -> HumorSignals {
        HumorSignals {
            active,
            level: self.level,
        }
    }
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

fn is_stable(e: &EmotionVector) -> bool {
    [e.sadness, e.fear, e.shame]
        .iter()
        .all(|v| *v < STABILITY_THRESHOLD)
}

/// Which playful opening the message is, if any. First match wins.
pub fn playful_intent(message: &str) -> Option<PlayfulIntent> {
    let m = message.trim().to_lowercase();
    let has = |s: &str| m.contains(s);
    if has("boring") || has("lame") {
        Some(PlayfulIntent::Boring)
    } else if has("what are you doing") || has("what're you doing") || has("what you doing") {
        Some(PlayfulIntent::WhatDoing)
    } else if has("do you even work") || has("do u work") || (has("you work") && has("?")) {
        Some(PlayfulIntent::DoYouWork)
    } else if has("slow") && (has("you") || has("so slow")) {
        Some(PlayfulIntent::Slow)
    } else if has("miss me") || has("missed me") {
        Some(PlayfulIntent::MissMe)
    } else if has("how was your day") || has("how's your day") || has("hows your day") {
        Some(PlayfulIntent::HowWasDay)
    } else if has("glad") && (has("hear") || has("good")) {
        Some(PlayfulIntent::ImGlad)
    } else {
        None
    }
}

pub fn humor_reply<R: Rng + ?Sized>(intent: PlayfulIntent, rng: &mut R) -> &'static str {
    pick(rng, intent.pool())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_playful_message_raises_level() {
        let mut h = HumorEngine::new();
        let s = h.check("lol you're so slow", &EmotionVector::default(), false);
        assert!(s.active);
        assert!((s.level - 0.65).abs() < 1e-6);
    }

    #[test]
    fn test_overload_and_serious_topics_wear_it_down() {
        let mut h = HumorEngine::new();
        assert!(!h.check("haha", &EmotionVector::default(), true).active);
        let s = h.check("my dog died, lol", &EmotionVector::default(), false);
        assert!(!s.active);
        assert!((s.level - 0.4).abs() < 1e-6);

        // Below the midpoint, plain messages get no humor
        assert!(!h.check("I made pasta tonight", &EmotionVector::default(), false).active);
    }

    #[test]
    fn test_unstable_mood_blocks_without_decay() {
        let mut h = HumorEngine::new();
        let sad = EmotionVector {
            sadness: 0.7,
            ..Default::default()
        };
        let s = h.check("haha nice one", &sad, false);
        assert!(!s.active);
        assert_eq!(s.level, START_LEVEL);
    }

    #[test]
    fn test_midpoint_level_allows_plain_messages() {
        let mut h = HumorEngine::new();
        assert!(h.check("I made pasta tonight", &EmotionVector::default(), false).active);
    }

    #[test]
    fn test_playful_intents() {
        assert_eq!(playful_intent("this is BORING"), Some(PlayfulIntent::Boring));
        assert_eq!(playful_intent("what are you doing"), Some(PlayfulIntent::WhatDoing));
        assert_eq!(playful_intent("do you even work"), Some(PlayfulIntent::DoYouWork));
        assert_eq!(playful_intent("you work?"), Some(PlayfulIntent::DoYouWork));
        assert_eq!(playful_intent("you work"), None);
        assert_eq!(playful_intent("you're so slow"), Some(PlayfulIntent::Slow));
        assert_eq!(playful_intent("did you miss me"), Some(PlayfulIntent::MissMe));
        assert_eq!(playful_intent("how's your day"), Some(PlayfulIntent::HowWasDay));
        assert_eq!(playful_intent("glad to hear it"), Some(PlayfulIntent::ImGlad));
        assert_eq!(playful_intent("tell me about rust"), None);
    }

    #[test]
    fn test_reply_comes_from_matching_pool() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..10 {
            assert!(MISS_ME.contains(&humor_reply(PlayfulIntent::MissMe, &mut rng)));
        }
    }
}
