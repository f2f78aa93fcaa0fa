//! Simulated life events, so Kai has a "today" to talk about.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeEvent {
    pub description: String,
    pub category: String,
    pub tone: Tone,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

const POOL: &[(&str, &str, Tone)] = &[
    ("missed a deadline", "work", Tone::Negative),
    ("nailed a client call", "work", Tone::Positive),
    ("met a new client", "work", Tone::Neutral),
    ("finished a project early", "work", Tone::Positive),
    ("had to redo a deliverable", "work", Tone::Negative),
    ("got a weird request from a client", "work", Tone::Neutral),
    ("had coffee with a friend", "social", Tone::Positive),
    ("had a long call with an old friend", "social", Tone::Positive),
    ("video call with family", "social", Tone::Neutral),
    ("missed a call from my sister", "social", Tone::Negative),
    ("finished a story I was stuck on", "creative", Tone::Positive),
    ("started something new and have no idea where it's going", "creative", Tone::Neutral),
    ("couldn't focus on creative stuff", "creative", Tone::Negative),
    ("had a random idea at 3 AM", "creative", Tone::Neutral),
    ("slept badly", "daily", Tone::Negative),
    ("actually had a decent morning", "daily", Tone::Positive),
    ("forgot to eat until like 4 PM", "daily", Tone::Neutral),
    ("went for a walk", "daily", Tone::Positive),
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LifeEventDoc {
    pub events: Vec<LifeEvent>,
}

pub struct LifeEventLog {
    events: Vec<LifeEvent>,
    cap: usize,
}

impl LifeEventLog {
    pub fn new(cap: usize) -> Self {
        Self::from_doc(cap, LifeEventDoc::default())
    }

    pub fn from_doc(cap: usize, doc: LifeEventDoc) -> Self {
        let mut log = Self {
            events: doc.events,
            cap: cap.max(1),
        };
        log.trim();
        log
    }

    pub fn to_doc(&self) -> LifeEventDoc {
        LifeEventDoc {
            events: self.events.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Draw a new event from the pool and record it.
    pub fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &LifeEvent {
        let (description, category, tone) = *POOL.choose(rng).unwrap_or(&POOL[0]);
        self.events.push(LifeEvent {
            description: description.to_string(),
            category: category.to_string(),
            tone,
            timestamp: Utc::now(),
        });
        self.trim();
        tracing::debug!("Life event: {}", description);
        &self.events[self.events.len() - 1]
    }

    /// Descriptions of the last `limit` events, newest last.
    pub fn recent_descriptions(&self, limit: usize) -> Vec<String> {
        self.events[self.events.len().saturating_sub(limit)..]
            .iter()
            .map(|e| e.description.clone())
            .collect()
    }

    fn trim(&mut self) {
        if self.events.len() > self.cap {
            self.events.drain(..self.events.len() - self.cap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_and_recent() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut log = LifeEventLog::new(50);
        assert!(log.recent_descriptions(3).is_empty());
        let first = log.generate(&mut rng).description.clone();
        assert!(POOL.iter().any(|(d, _, _)| *d == first));
        log.generate(&mut rng);
        let recent = log.recent_descriptions(3);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0], first);
    }

    #[test]
    fn test_log_is_capped() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut log = LifeEventLog::new(4);
        for _ in 0..10 {
            log.generate(&mut rng);
        }
        assert_eq!(log.len(), 4);
    }
}
