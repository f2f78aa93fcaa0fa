//! Conversation history and the cross-session user profile.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use kai_core::EmotionVector;
use serde::{Deserialize, Serialize};

/// User-side text recorded for turns Kai started himself.
pub const INITIATED_MARKER: &str = "[Kai reached out]";

const LLM_TRUNCATE: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user: String,
    pub reply: String,
    pub emotion: EmotionVector,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn is_initiated(&self) -> bool {
        self.user == INITIATED_MARKER
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationDoc {
    pub history: Vec<ConversationTurn>,
}

/// Persisted summary of how the user has behaved across sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub boundary_violations: u32,
    pub apologies: u32,
    pub trust_level: f32,
    pub pattern_harassment: bool,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            boundary_violations: 0,
            apologies: 0,
            trust_level: 0.7,
            pattern_harassment: false,
        }
    }
}

pub struct ContextStore {
    history: VecDeque<ConversationTurn>,
    profile: UserProfile,
    max_history: usize,
}

impl ContextStore {
    pub fn new(max_history: usize) -> Self {
        Self::from_parts(max_history, ConversationDoc::default(), UserProfile::default())
    }

    pub fn from_parts(max_history: usize, doc: ConversationDoc, profile: UserProfile) -> Self {
        let mut store = Self {
            history: doc.history.into(),
            profile,
            max_history: max_history.max(1),
        };
        store.trim();
        store.profile.trust_level = store.profile.trust_level.clamp(0.0, 1.0);
        store
    }

    pub fn to_doc(&self) -> ConversationDoc {
        ConversationDoc {
            history: self.history.iter().cloned().collect(),
        }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn history(&self) -> &VecDeque<ConversationTurn> {
        &self.history
    }

    pub fn append_turn(&mut self, user: &str, reply: &str, emotion: EmotionVector) {
        self.history.push_back(ConversationTurn {
            user: user.to_string(),
            reply: reply.to_string(),
            emotion,
            timestamp: Utc::now(),
        });
        self.trim();
    }

    pub fn recent(&self, n: usize) -> impl Iterator<Item = &ConversationTurn> {
        self.history.iter().skip(self.history.len().saturating_sub(n))
    }

    /// The last `n` things the user actually typed, oldest first.
    pub fn recent_user_messages(&self, n: usize) -> Vec<String> {
        let typed: Vec<&ConversationTurn> =
            self.history.iter().filter(|t| !t.is_initiated()).collect();
        typed[typed.len().saturating_sub(n)..]
            .iter()
            .map(|t| t.user.clone())
            .collect()
    }

    pub fn last_user_turn(&self) -> Option<&ConversationTurn> {
        self.history.iter().rev().find(|t| !t.is_initiated())
    }

    /// Profile summary plus the last `n` turns, for model prompts.
    pub fn context_for_llm(&self, n: usize) -> String {
        let p = &self.profile;
        let mut lines = vec![format!(
            "User profile: boundary_violations={}, apologies={}, trust_level={:.2}.",
            p.boundary_violations, p.apologies, p.trust_level
        )];
        if p.pattern_harassment {
            lines.push("Pattern: user has repeated same insults (harassment).".to_string());
        }
        lines.push(String::new());
        lines.push("Recent conversation:".to_string());
        for (i, turn) in self.recent(n).enumerate() {
            lines.push(format!("  {}. User: {}", i + 1, truncate(&turn.user)));
            lines.push(format!("     Kai: {}", truncate(&turn.reply)));
        }
        lines.join("\n")
    }

    pub fn record_apology(&mut self) {
        self.profile.apologies += 1;
    }

    pub fn update_profile(&mut self, violations: u32, trust: f32, harassment: bool) {
        self.profile.boundary_violations = violations;
        self.profile.trust_level = trust.clamp(0.0, 1.0);
        self.profile.pattern_harassment = harassment;
    }

    fn trim(&mut self) {
        while self.history.len() > self.max_history {
            self.history.pop_front();
        }
    }
}

fn truncate(s: &str) -> String {
    s.chars().take(LLM_TRUNCATE).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_bounded() {
        let mut c = ContextStore::new(3);
        for i in 0..5 {
            c.append_turn(&format!("u{}", i), "r", EmotionVector::default());
        }
        assert_eq!(c.history().len(), 3);
        assert_eq!(c.history()[0].user, "u2");
    }

    #[test]
    fn test_recent_user_messages_skip_initiated() {
        let mut c = ContextStore::new(30);
        c.append_turn("hello", "hi", EmotionVector::default());
        c.append_turn(INITIATED_MARKER, "Hey. No reason.", EmotionVector::default());
        c.append_turn("how are you", "fine", EmotionVector::default());
        assert_eq!(c.recent_user_messages(5), vec!["hello", "how are you"]);
        assert_eq!(c.recent_user_messages(1), vec!["how are you"]);
        assert_eq!(c.last_user_turn().unwrap().user, "how are you");
    }

    #[test]
    fn test_context_for_llm() {
        let mut c = ContextStore::new(30);
        c.append_turn("hi", "Hey!", EmotionVector::default());
        c.update_profile(2, 1.7, true);
        let ctx = c.context_for_llm(10);
        assert!(ctx.contains("boundary_violations=2"));
        assert!(ctx.contains("trust_level=1.00"));
        assert!(ctx.contains("harassment"));
        assert!(ctx.contains("1. User: hi"));
        assert!(ctx.contains("Kai: Hey!"));
    }

    #[test]
    fn test_profile_defaults_on_partial_json() {
        let p: UserProfile = serde_json::from_str(r#"{"apologies": 3}"#).unwrap();
        assert_eq!(p.apologies, 3);
        assert!((p.trust_level - 0.7).abs() < 1e-6);
    }
}
