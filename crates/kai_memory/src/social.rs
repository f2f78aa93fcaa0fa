//! Background social circle. No agents, just relationship scores that
//! drift with contact and time and feed loneliness.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use kai_core::config::SocialConfig;
use serde::{Deserialize, Serialize};

pub const USER: &str = "user";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    pub role: String,
    pub trust: f32,
    pub attachment: f32,
    #[serde(default)]
    pub conflict: f32,
    pub last_contact: DateTime<Utc>,
}

impl Relationship {
    fn new(id: &str, trust: f32, attachment: f32) -> Self {
        Self {
            id: id.to_string(),
            role: id.to_string(),
            trust,
            attachment,
            conflict: 0.0,
            last_contact: Utc::now(),
        }
    }
}

fn default_cast() -> BTreeMap<String, Relationship> {
    [
        ("family", 0.7, 0.7),
        ("friend", 0.6, 0.5),
        ("partner", 0.5, 0.4),
        ("mentor", 0.6, 0.4),
        (USER, 0.8, 0.6),
    ]
    .into_iter()
    .map(|(id, t, a)| (id.to_string(), Relationship::new(id, t, a)))
    .collect()
}

/// Persisted form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialDoc {
    pub relationships: BTreeMap<String, Relationship>,
}

impl Default for SocialDoc {
    fn default() -> Self {
        Self {
            relationships: default_cast(),
        }
    }
}

pub struct SocialLedger {
    relationships: BTreeMap<String, Relationship>,
    config: SocialConfig,
}

impl SocialLedger {
    pub fn new(config: SocialConfig) -> Self {
        Self::from_doc(config, SocialDoc::default())
    }

    pub fn from_doc(config: SocialConfig, doc: SocialDoc) -> Self {
        let mut relationships = doc.relationships;
        relationships
            .entry(USER.to_string())
            .or_insert_with(|| Relationship::new(USER, 0.8, 0.6));
        Self {
            relationships,
            config,
        }
    }

    pub fn to_doc(&self) -> SocialDoc {
        SocialDoc {
            relationships: self.relationships.clone(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.relationships.get(id)
    }

    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }

    pub fn user_trust(&self) -> f32 {
        self.get(USER).map_or(0.5, |r| r.trust)
    }

    /// Record contact. Unknown ids are ignored.
    pub fn on_contact(&mut self, id: &str, positive: bool, strength: f32) {
        let Some(r) = self.relationships.get_mut(id) else {
            return;
        };
        let s = strength.clamp(0.0, 1.0);
        r.last_contact = Utc::now();
        if positive {
            r.trust = (r.trust + s).min(1.0);
            r.attachment = (r.attachment + s * 0.5).min(1.0);
            r.conflict = (r.conflict - s * 0.5).max(0.0);
        } else {
            r.trust = (r.trust - s).max(0.0);
            r.conflict = (r.conflict + s).min(1.0);
        }
    }

    /// Slow decay of everyone except the user after a day without contact.
    pub fn tick(&mut self, delta_days: f32) {
        self.tick_at(delta_days, Utc::now());
    }

    pub fn tick_at(&mut self, delta_days: f32, now: DateTime<Utc>) {
        let decay = self.config.decay_per_day * delta_days.max(0.0);
        let floor = self.config.floor;
        for r in self.relationships.values_mut().filter(|r| r.id != USER) {
            let days_since = (now - r.last_contact).num_seconds() as f32 / 86_400.0;
            if days_since > 1.0 {
                r.attachment = (r.attachment - decay).max(floor);
                r.trust = (r.trust - decay * 0.5).max(floor);
            }
        }
    }

    /// 0 = well connected, 1 = isolated.
    pub fn loneliness_factor(&self) -> f32 {
        if self.relationships.is_empty() {
            return 0.5;
        }
        let avg = self.relationships.values().map(|r| r.attachment).sum::<f32>()
            / self.relationships.len() as f32;
        (1.0 - avg).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> SocialLedger {
        SocialLedger::new(SocialConfig::default())
    }

    #[test]
    fn test_default_cast() {
        let l = ledger();
        assert_eq!(l.relationships().count(), 5);
        assert!((l.user_trust() - 0.8).abs() < 1e-6);
        // mean attachment (0.7+0.5+0.4+0.4+0.6)/5 = 0.52
        assert!((l.loneliness_factor() - 0.48).abs() < 1e-5);
    }

    #[test]
    fn test_contact() {
        let mut l = ledger();
        l.on_contact(USER, true, 0.1);
        let u = l.get(USER).unwrap();
        assert!((u.trust - 0.9).abs() < 1e-6);
        assert!((u.attachment - 0.65).abs() < 1e-6);
        assert_eq!(u.conflict, 0.0);

        l.on_contact(USER, false, 0.3);
        let u = l.get(USER).unwrap();
        assert!((u.trust - 0.6).abs() < 1e-6);
        assert!((u.conflict - 0.3).abs() < 1e-6);

        // Unknown ids are a no-op
        l.on_contact("stranger", true, 0.5);
        assert!(l.get("stranger").is_none());
    }

    #[test]
    fn test_tick_spares_user_and_respects_floor() {
        let mut l = ledger();
        let later = Utc::now() + chrono::Duration::days(3);
        l.tick_at(100.0, later);
        for r in l.relationships() {
            if r.id == USER {
                assert!((r.attachment - 0.6).abs() < 1e-6);
            } else {
                assert!((r.attachment - 0.2).abs() < 1e-6);
                assert!(r.trust >= 0.2);
            }
        }
    }

    #[test]
    fn test_recent_contact_is_not_decayed() {
        let mut l = ledger();
        l.tick(1.0);
        assert!((l.get("family").unwrap().attachment - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_user_always_present() {
        let doc = SocialDoc {
            relationships: BTreeMap::new(),
        };
        let l = SocialLedger::from_doc(SocialConfig::default(), doc);
        assert!(l.get(USER).is_some());
    }
}
