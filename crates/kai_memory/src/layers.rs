//! Layered, emotion-weighted memory.
//!
//! Short-term -> long-term -> conscious / subconscious. Weight decides the
//! layer once at creation; afterwards only the recall counter and, during
//! consolidation, the long-term weights change.

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};
use kai_core::config::MemoryConfig;
use kai_core::EmotionVector;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    #[serde(rename = "stm")]
    ShortTerm,
    #[serde(rename = "ltm")]
    LongTerm,
    #[serde(rename = "conscious")]
    Conscious,
    #[serde(rename = "subconscious")]
    Subconscious,
}

impl Layer {
    pub fn as_str(self) -> &'static str {
        match self {
            Layer::ShortTerm => "stm",
            Layer::LongTerm => "ltm",
            Layer::Conscious => "conscious",
            Layer::Subconscious => "subconscious",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: Uuid,
    pub event: String,
    pub context: String,
    pub created_at: DateTime<Utc>,
    pub emotion: EmotionVector,
    pub weight: f32,
    pub layer: Layer,
    pub recalled_count: u32,
}

/// Persisted form: one list per layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryLayers {
    pub short_term: VecDeque<Memory>,
    pub long_term: Vec<Memory>,
    pub conscious: Vec<Memory>,
    pub subconscious: Vec<Memory>,
}

/// Importance of an experience from its emotional charge, novelty and
/// repetition.
pub fn compute_weight(emotion: &EmotionVector, novelty: f32, repetition: f32) -> f32 {
    let w = 0.3 * emotion.max()
        + 0.3 * emotion.mean()
        + 0.2 * novelty.clamp(0.0, 1.0)
        + 0.2 * repetition.clamp(0.0, 1.0);
    w.min(1.0)
}

pub struct MemoryStore {
    config: MemoryConfig,
    layers: MemoryLayers,
}

impl MemoryStore {
    pub fn new(config: MemoryConfig) -> Self {
        Self::from_layers(config, MemoryLayers::default())
    }

    /// Restore from persisted layers, re-applying the configured caps.
    pub fn from_layers(config: MemoryConfig, layers: MemoryLayers) -> Self {
        let mut store = Self { config, layers };
        store.trim_short_term();
        store.trim_long_term();
        store.trim_conscious();
        store
    }

    pub fn layers(&self) -> &MemoryLayers {
        &self.layers
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Layer for a given weight, or `None` when the memory is forgotten.
    pub fn assign_layer(&self, weight: f32, emotion: &EmotionVector) -> Option<Layer> {
        let c = &self.config;
        let fear_shame = (emotion.fear + emotion.shame) / 2.0;
        if weight >= c.trauma_threshold && fear_shame > 0.6 {
            Some(Layer::Subconscious)
        } else if weight >= c.identity_threshold {
            Some(Layer::Conscious)
        } else if weight >= c.long_term_threshold {
            Some(Layer::LongTerm)
        } else if weight >= c.short_term_threshold {
            Some(Layer::ShortTerm)
        } else {
            None
        }
    }

    /// Encode an experience. Returns `None` when its weight is too low to
    /// be remembered; nothing is mutated in that case.
    pub fn store(
        &mut self,
        event: &str,
        context: &str,
        emotion: &EmotionVector,
        novelty: f32,
        repetition: f32,
    ) -> Option<Memory> {
        let weight = compute_weight(emotion, novelty, repetition);
        if weight < self.config.forget_threshold {
            return None;
        }
        let layer = self.assign_layer(weight, emotion)?;

        let memory = Memory {
            id: Uuid::new_v4(),
            event: event.to_string(),
            context: context.to_string(),
            created_at: Utc::now(),
            emotion: *emotion,
            weight,
            layer,
            recalled_count: 0,
        };

        // Every stored memory is part of the active context.
        self.layers.short_term.push_back(memory.clone());
        self.trim_short_term();

        match layer {
            Layer::LongTerm => {
                self.layers.long_term.push(memory.clone());
                self.trim_long_term();
            }
            Layer::Conscious => {
                self.layers.conscious.push(memory.clone());
                self.trim_conscious();
            }
            Layer::Subconscious => self.layers.subconscious.push(memory.clone()),
            Layer::ShortTerm => {}
        }

        tracing::trace!("Stored memory w={:.2} layer={}", weight, layer.as_str());
        Some(memory)
    }

    /// Mood-congruent recall over every candidate. Bumps the recall
    /// counter of every returned memory.
    ///
    /// `layer = None` searches short-term, long-term and conscious;
    /// subconscious memories surface only when asked for explicitly.
    pub fn recall(
        &mut self,
        mood: Option<&EmotionVector>,
        layer: Option<Layer>,
        limit: usize,
    ) -> Vec<Memory> {
        if limit == 0 {
            return Vec::new();
        }
        let wants = |l: Layer| layer.map_or(true, |x| x == l);
        let tail = |len: usize, n: usize| len.saturating_sub(n);

        let mut candidates: Vec<&Memory> = Vec::new();
        if wants(Layer::ShortTerm) {
            let st = &self.layers.short_term;
            candidates.extend(st.iter().skip(tail(st.len(), limit)));
        }
        if wants(Layer::LongTerm) {
            let lt = &self.layers.long_term;
            candidates.extend(&lt[tail(lt.len(), limit * 2)..]);
        }
        if wants(Layer::Conscious) {
            let c = &self.layers.conscious;
            candidates.extend(&c[tail(c.len(), limit)..]);
        }
        if layer == Some(Layer::Subconscious) {
            let s = &self.layers.subconscious;
            candidates.extend(&s[tail(s.len(), limit)..]);
        }

        let mut seen = HashSet::new();
        let mut scored: Vec<(f32, &Memory)> = candidates
            .into_iter()
            .filter(|m| seen.insert(m.id))
            .map(|m| {
                let mut score = m.weight * (1.0 + 0.1 * m.recalled_count as f32);
                if let Some(mood) = mood {
                    score *= 1.0 + 0.2 * mood.similarity(&m.emotion);
                }
                (score, m)
            })
            .collect();

        // Stable: equal scores keep candidate order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        let ids: Vec<Uuid> = scored.iter().take(limit).map(|(_, m)| m.id).collect();

        for id in &ids {
            self.bump_recall(*id);
        }
        ids.iter().filter_map(|id| self.find(*id).cloned()).collect()
    }

    /// Most recent short-term events, newest last. Does not count as recall.
    pub fn peek_recent(&self, n: usize) -> Vec<String> {
        let st = &self.layers.short_term;
        st.iter()
            .skip(st.len().saturating_sub(n))
            .map(|m| m.event.clone())
            .collect()
    }

    /// Exponential time decay of long-term weights, then re-cap.
    pub fn consolidate(&mut self, decay_rate: f32) {
        self.consolidate_at(decay_rate, Utc::now());
    }

    pub fn consolidate_at(&mut self, decay_rate: f32, now: DateTime<Utc>) {
        for m in &mut self.layers.long_term {
            let age_days = (now - m.created_at).num_seconds().max(0) as f32 / 86_400.0;
            m.weight *= (-decay_rate * age_days).exp();
        }
        self.trim_long_term();
        tracing::debug!(
            "Consolidated {} long-term memories",
            self.layers.long_term.len()
        );
    }

    pub fn counts(&self) -> MemoryCounts {
        MemoryCounts {
            short_term: self.layers.short_term.len(),
            long_term: self.layers.long_term.len(),
            conscious: self.layers.conscious.len(),
            subconscious: self.layers.subconscious.len(),
        }
    }

    fn find(&self, id: Uuid) -> Option<&Memory> {
        let l = &self.layers;
        l.short_term
            .iter()
            .chain(&l.long_term)
            .chain(&l.conscious)
            .chain(&l.subconscious)
            .find(|m| m.id == id)
    }

    // A memory can sit in short-term and one other layer; both copies count.
    fn bump_recall(&mut self, id: Uuid) {
        let l = &mut self.layers;
        l.short_term
            .iter_mut()
            .chain(l.long_term.iter_mut())
            .chain(l.conscious.iter_mut())
            .chain(l.subconscious.iter_mut())
            .filter(|m| m.id == id)
            .for_each(|m| m.recalled_count += 1);
    }

    fn trim_short_term(&mut self) {
        let cap = self.config.short_term_capacity;
        while self.layers.short_term.len() > cap {
            self.layers.short_term.pop_front();
        }
    }

    fn trim_long_term(&mut self) {
        let cap = self.config.long_term_cap;
        let lt = &mut self.layers.long_term;
        if lt.len() > cap {
            lt.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(std::cmp::Ordering::Equal));
            lt.truncate(cap);
        }
    }

    fn trim_conscious(&mut self) {
        let cap = self.config.conscious_cap;
        let c = &mut self.layers.conscious;
        if c.len() > cap {
            c.drain(..c.len() - cap);
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryCounts {
    pub short_term: usize,
    pub long_term: usize,
    pub conscious: usize,
    pub subconscious: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(v: f32) -> EmotionVector {
        EmotionVector {
            joy: v,
            sadness: v,
            anger: v,
            fear: v,
            love: v,
            shame: v,
            pride: v,
            hope: v,
            loneliness: v,
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::new(MemoryConfig::default())
    }

    #[test]
    fn test_trauma_goes_subconscious() {
        let mut s = store();
        let m = s.store("bad night", "test", &uniform(0.9), 0.5, 1.0).unwrap();
        assert_eq!(m.layer, Layer::Subconscious);
        assert_eq!(s.counts().subconscious, 1);
        assert_eq!(s.counts().short_term, 1);
    }

    #[test]
    fn test_threshold_ladder() {
        let s = store();
        let calm = EmotionVector::default();
        assert_eq!(s.assign_layer(0.6, &calm), Some(Layer::LongTerm));
        assert_eq!(s.assign_layer(0.8, &calm), Some(Layer::Conscious));
        assert_eq!(s.assign_layer(0.4, &calm), Some(Layer::ShortTerm));
        assert_eq!(s.assign_layer(0.3, &calm), None);
        // High weight without fear/shame is identity, not trauma
        assert_eq!(s.assign_layer(0.95, &calm), Some(Layer::Conscious));
    }

    #[test]
    fn test_low_weight_is_forgotten() {
        let mut s = store();
        assert!(s.store("meh", "test", &EmotionVector::default(), 0.5, 0.0).is_none());
        // Between forget and short-term is also dropped
        assert!(s.store("meh", "test", &EmotionVector::default(), 0.5, 1.0).is_none());
        assert_eq!(s.counts(), MemoryCounts::default());
    }

    #[test]
    fn test_short_term_capacity_evicts_oldest() {
        let mut s = store();
        for i in 0..10 {
            s.store(&format!("event {}", i), "test", &uniform(0.5), 0.5, 1.0);
        }
        let st = &s.layers().short_term;
        assert_eq!(st.len(), 7);
        assert_eq!(st.front().unwrap().event, "event 3");
        assert_eq!(s.peek_recent(2), vec!["event 8", "event 9"]);
    }

    #[test]
    fn test_recall_ranks_by_weight_and_bumps_counter() {
        let mut s = store();
        s.store("weak", "test", &uniform(0.3), 0.5, 1.0).unwrap();
        s.store("strong", "test", &uniform(0.6), 0.5, 1.0).unwrap();
        let got = s.recall(None, None, 2);
        assert_eq!(got[0].event, "strong");
        assert_eq!(got[0].recalled_count, 1);

        // Repeated recall keeps raising the counter on every copy
        s.recall(None, None, 1);
        let all: Vec<_> = s
            .layers()
            .short_term
            .iter()
            .chain(&s.layers().long_term)
            .filter(|m| m.event == "strong")
            .collect();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|m| m.recalled_count == 2));
    }

    #[test]
    fn test_recall_counter_lifts_score() {
        let mut s = store();
        s.store("a", "test", &uniform(0.3), 0.5, 1.0).unwrap();
        s.store("b", "test", &uniform(0.3), 0.5, 1.0).unwrap();
        // Equal weight: insertion order wins
        assert_eq!(s.recall(None, None, 2)[0].event, "a");
        s.layers.short_term[1].recalled_count = 3;
        assert_eq!(s.recall(None, None, 2)[0].event, "b");
    }

    #[test]
    fn test_weight_at_long_term_threshold_is_long_term() {
        let calm = uniform(0.5);
        let w = compute_weight(&calm, 0.5, 1.0);
        let at = MemoryConfig {
            long_term_threshold: w,
            ..Default::default()
        };
        let mut s = MemoryStore::new(at.clone());
        let m = s.store("edge", "test", &calm, 0.5, 1.0).unwrap();
        assert_eq!(m.layer, Layer::LongTerm);
        assert_eq!(s.counts().long_term, 1);

        // One ulp above the weight and it stays short-term only
        let above = MemoryConfig {
            long_term_threshold: f32::from_bits(w.to_bits() + 1),
            ..at
        };
        let mut s = MemoryStore::new(above);
        let m = s.store("edge", "test", &calm, 0.5, 1.0).unwrap();
        assert_eq!(m.layer, Layer::ShortTerm);
        assert_eq!(s.counts().long_term, 0);
    }

    #[test]
    fn test_recall_scores_every_entry() {
        let mut s = store();
        s.store("Went Hiking", "test", &uniform(0.5), 0.5, 1.0);
        s.store("cooked dinner", "test", &uniform(0.6), 0.5, 1.0);
        let got = s.recall(None, None, 5);
        let events: Vec<&str> = got.iter().map(|m| m.event.as_str()).collect();
        assert!(events.contains(&"Went Hiking"));
        assert_eq!(events[0], "cooked dinner");
    }

    #[test]
    fn test_subconscious_only_on_request() {
        let mut s = store();
        s.store("trauma", "test", &uniform(0.9), 0.5, 1.0);
        // Still reachable through short-term, but not from the subconscious list
        let general = s.recall(None, None, 5);
        assert_eq!(general.len(), 1);
        let deep = s.recall(None, Some(Layer::Subconscious), 5);
        assert_eq!(deep.len(), 1);
        assert_eq!(deep[0].layer, Layer::Subconscious);
    }

    #[test]
    fn test_consolidate_decays_long_term() {
        let mut s = store();
        s.store("old", "test", &uniform(0.6), 0.5, 1.0).unwrap();
        let before = s.layers().long_term[0].weight;
        let later = Utc::now() + chrono::Duration::days(30);
        s.consolidate_at(0.01, later);
        let after = s.layers().long_term[0].weight;
        assert!(after < before);
        assert!((after - before * (-0.3f32).exp()).abs() < 1e-3);
    }

    #[test]
    fn test_long_term_cap_keeps_heaviest() {
        let config = MemoryConfig {
            long_term_cap: 2,
            ..Default::default()
        };
        let mut s = MemoryStore::new(config);
        for v in [0.5, 0.7, 0.6] {
            s.store("x", "test", &uniform(v), 0.5, 1.0);
        }
        let w: Vec<f32> = s.layers().long_term.iter().map(|m| m.weight).collect();
        assert_eq!(w.len(), 2);
        assert!(w[0] >= w[1]);
        assert!(w.iter().all(|x| *x > compute_weight(&uniform(0.5), 0.5, 1.0)));
    }
}
