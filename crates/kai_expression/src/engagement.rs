//! Engagement detection: a reply is not engagement.
//!
//! Scores the recent user messages; a negative sum switches off affection
//! gain, lower sums trigger topic switches and then minimal replies.

use kai_core::pick;
use kai_core::snapshot::EngagementSignals;
use rand::Rng;

pub const WINDOW: usize = 5;

const LOW_ENGAGEMENT_WORDS: &[&str] = &[
    "hmm", "huh", "ahan", "aha", "ok", "ohk", "okay", "sure", "hmmm", "yeah", "yep", "nope", "nah",
    "k", "mk", "mhm", "right", "cool", "nice", "alright", "whatever", "idc", "meh", "okey", "yup",
];

const MINIMAL_REPLIES: &[&str] = &["Got you.", "Alright.", "Hmm, yeah.", "Fair enough.", "Cool.", "Okay."];
const MINIMAL_REPLIES_LOW_MOOD: &[&str] = &["Okay.", "Cool.", "Sure."];

const SWITCH_TOPIC_REPLIES: &[&str] = &[
    "Okay… I think I'm losing you. Want to talk about something else?",
    "Fair. Want to change topic?",
    "Got it. What's on your mind?",
    "Alright. So, what are you up to these days?",
    "I'll stop there. Anything else you wanna talk about?",
];
const SWITCH_TOPIC_REPLIES_LOW_MOOD: &[&str] = &["You?", "What's up with you?", "Your turn."];

pub const TOPIC_FATIGUE_REPLIES: &[&str] = &[
    "Anyway, enough about that. What are you up to?",
    "Let's switch gears. What's good with you?",
    "I'll stop going there. What's on your mind?",
];

/// Mentions past this many make the topic saturated.
pub const TOPIC_FATIGUE_AFTER: u32 = 3;

/// Prompt note while the heavy topic is saturated.
pub const TOPIC_SATURATION_NOTE: &str = "IMPORTANT: Mira has come up a lot lately. Avoid \
bringing her up unless directly asked. Focus on other parts of your life: work, writing, \
friends, the user, your own thoughts. Looping back to her feels clingy.";

/// True when the message touches the one topic Kai tends to ruminate on:
/// Mira, or the partner who left.
pub fn mentions_heavy_topic(message: &str) -> bool {
    let m = message.to_lowercase();
    let named = m.split(|c: char| !c.is_alphanumeric()).any(|w| w == "mira");
    named || (m.contains("partner") && m.contains("left"))
}

pub fn topic_fatigue_reply<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    pick(rng, TOPIC_FATIGUE_REPLIES)
}

/// -1 for empty or filler, 0 for one or two words, 1 otherwise.
pub fn score(message: &str) -> i32 {
    let t = message.trim().to_lowercase();
    if t.is_empty() || LOW_ENGAGEMENT_WORDS.contains(&t.as_str()) {
        return -1;
    }
    if t.split_whitespace().count() < 3 {
        0
    } else {
        1
    }
}

/// Engagement over the previous `WINDOW - 1` user messages plus the current one.
pub fn assess<S: AsRef<str>>(current: &str, previous: &[S]) -> EngagementSignals {
    let skip = previous.len().saturating_sub(WINDOW - 1);
    let sum: i32 = previous[skip..]
        .iter()
        .map(|m| score(m.as_ref()))
        .sum::<i32>()
        + score(current);
    EngagementSignals {
        sum,
        disable_affection: sum < 0,
        switch_topic: sum <= -3,
        minimal: sum <= -4,
    }
}

pub fn minimal_reply<R: Rng + ?Sized>(willing_to_talk: bool, rng: &mut R) -> &'static str {
    if willing_to_talk {
        pick(rng, MINIMAL_REPLIES)
    } else {
        pick(rng, MINIMAL_REPLIES_LOW_MOOD)
    }
}

pub fn switch_topic_reply<R: Rng + ?Sized>(willing_to_talk: bool, rng: &mut R) -> &'static str {
    if willing_to_talk {
        pick(rng, SWITCH_TOPIC_REPLIES)
    } else {
        pick(rng, SWITCH_TOPIC_REPLIES_LOW_MOOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_score() {
        assert_eq!(score(""), -1);
        assert_eq!(score("  Ok "), -1);
        assert_eq!(score("Hi!"), 0);
        assert_eq!(score("oh really"), 0);
        assert_eq!(score("I went hiking today"), 1);
    }

    #[test]
    fn test_assess_window_and_levels() {
        let prev = ["tell me a story please", "ok", "k", "cool", "meh"];
        // Oldest message falls out of the window: -1 * 4 + current
        let e = assess("hmm", &prev);
        assert_eq!(e.sum, -5);
        assert!(e.disable_affection && e.switch_topic && e.minimal);

        let e = assess("sure", &["ok", "k"]);
        assert_eq!(e.sum, -3);
        assert!(e.switch_topic);
        assert!(!e.minimal);

        let e = assess("what did you do today", &Vec::<String>::new());
        assert_eq!(e.sum, 1);
        assert!(!e.disable_affection);
    }

    #[test]
    fn test_reply_pools() {
        let mut rng = StdRng::seed_from_u64(9);
        assert!(MINIMAL_REPLIES.contains(&minimal_reply(true, &mut rng)));
        assert!(MINIMAL_REPLIES_LOW_MOOD.contains(&minimal_reply(false, &mut rng)));
        assert!(SWITCH_TOPIC_REPLIES_LOW_MOOD.contains(&switch_topic_reply(false, &mut rng)));
        assert!(TOPIC_FATIGUE_REPLIES.contains(&topic_fatigue_reply(&mut rng)));
    }

    #[test]
    fn test_heavy_topic_mentions() {
        assert!(mentions_heavy_topic("I keep thinking about MIRA"));
        assert!(mentions_heavy_topic("my partner left last spring"));
        assert!(!mentions_heavy_topic("my partner is great"));
        assert!(!mentions_heavy_topic("I left work early"));
        assert!(!mentions_heavy_topic("that was a miracle"));
    }
}
