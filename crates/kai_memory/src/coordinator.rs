//! Session coordinator: owns one user's simulated psyche and runs the
//! fixed per-turn pipeline over it.
//!
//! All state sits behind a single `tokio::sync::Mutex`, so a user turn and
//! a background initiator pass never interleave. The responder is the only
//! step that awaits external I/O; it is time-boxed and degrades to a fixed
//! reply.
//!
//! Turn order (later steps read what earlier ones wrote):
//! classify -> emotion event -> memory -> topic fatigue -> engagement ->
//! social contact -> loneliness feedback -> oxytocin -> clamp / decay /
//! regulate -> secure attachment -> drift -> wellbeing -> coping -> humor
//! -> mode -> snapshot -> reply -> trim / loop breaker -> persist.

use std::sync::{Arc, Weak};
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tokio::sync::{Mutex, Notify};

use kai_core::config::KaiConfig;
use kai_core::sentiment::{anchor_to_topic, extract_topic};
use kai_core::snapshot::{BoundaryFlags, ReplyStyle};
use kai_core::{
    classify, detect_intent, EmotionEngine, EmotionVector, EmotionalState, EventKind,
    HormoneChange, Intent, Mode, ModeSignals, PersonalityAdapter, PersonalityState, Responder,
    Scalar, TurnSnapshot,
};
use kai_expression::engagement::{TOPIC_FATIGUE_AFTER, TOPIC_SATURATION_NOTE, WINDOW};
use kai_expression::{
    assess, humor_reply, mentions_heavy_topic, minimal_reply, playful_intent, reply_length,
    switch_topic_reply, topic_fatigue_reply, trim_reply, HumorEngine, InitiatorPolicy,
    InitiatorSignals, Inbox, PendingMessage,
};
use kai_limbic::wellbeing::MentalHealthIndex;
use kai_limbic::{coping, BoundaryEngine, MentalHealth};

use crate::context::{ContextStore, UserProfile, INITIATED_MARKER};
use crate::layers::{MemoryCounts, MemoryStore};
use crate::life::LifeEventLog;
use crate::persist::{load_or_default, save_json, DataDir, LoadOrigin, Loaded};
use crate::social::{Relationship, SocialLedger, USER};

/// Reply when the responder fails or times out.
pub const FALLBACK_REPLY: &str = "Sorry, my thoughts got tangled for a second. Can you say that again?";
/// Reply when the same line would go out a third time in a row.
pub const LOOP_BREAKER_REPLY: &str =
    "Wait… I think I'm repeating myself. What did you really want to know?";

const SIMPLE_PHRASES: &[&str] = &[
    "I'll keep it simple.",
    "I'll keep it simple,",
    "Let me keep it simple.",
    "Keeping it simple.",
];

const MEMORY_CONTEXT: &str = "user_chat";
const CONTEXT_TURNS: usize = 10;

// ============================================================================
// Public types
// ============================================================================

/// Which branch of the reply ladder produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Disengaged,
    Minimal,
    SwitchTopic,
    TopicFatigue,
    Harassment,
    Boundary,
    Cooldown,
    Humor,
    Responder,
    Fallback,
    LoopBreaker,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub reply: String,
    pub source: ReplySource,
    pub emotion: EmotionVector,
    pub hormone_changes: Vec<HormoneChange>,
    pub boundary: BoundaryFlags,
    pub mode: Mode,
    pub intent: Option<Intent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MentalSummary {
    pub overall: f32,
    pub index: MentalHealthIndex,
    pub healing_mode: bool,
    pub self_soothing: bool,
    pub low_mood_turns: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocialSummary {
    pub loneliness_factor: f32,
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextSummary {
    pub turns: usize,
    pub profile: UserProfile,
    pub current_topic: Option<String>,
    pub recent_memories: Vec<String>,
    pub recent_life_events: Vec<String>,
}

/// Read-only view of the whole session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    pub mode: Mode,
    pub emotion: EmotionVector,
    pub hormones: EmotionalState,
    pub personality: PersonalityState,
    pub mental: MentalSummary,
    pub social: SocialSummary,
    pub boundary: BoundaryFlags,
    pub context: ContextSummary,
    pub memory: MemoryCounts,
    pub humor_level: f32,
    pub pending: usize,
    pub responder: String,
}

/// The reply backends a session routes between.
#[derive(Clone)]
pub struct Responders {
    /// Handles every intent; always in character.
    pub rule_based: Arc<dyn Responder>,
    /// Optional model backend for open-ended intents.
    pub open_ended: Option<Arc<dyn Responder>>,
}

impl Responders {
    pub fn rule_based(responder: Arc<dyn Responder>) -> Self {
        Self {
            rule_based: responder,
            open_ended: None,
        }
    }

    fn model_for(&self, intent: Intent) -> Option<&Arc<dyn Responder>> {
        self.open_ended
            .as_ref()
            .filter(|model| model.handles_open_ended() && !intent.always_rule_based())
    }

    fn route(&self, intent: Intent) -> &Arc<dyn Responder> {
        self.model_for(intent).unwrap_or(&self.rule_based)
    }

    fn label(&self) -> String {
        match &self.open_ended {
            Some(model) => format!("{}+{}", self.rule_based.name(), model.name()),
            None => self.rule_based.name().to_string(),
        }
    }
}

// ============================================================================
// Session
// ============================================================================

struct Inner {
    engine: EmotionEngine,
    memory: MemoryStore,
    personality: PersonalityAdapter,
    boundary: BoundaryEngine,
    mental: MentalHealth,
    social: SocialLedger,
    context: ContextStore,
    life: LifeEventLog,
    humor: HumorEngine,
    inbox: Inbox,
    rng: StdRng,
    heavy_topic_mentions: u32,
    current_topic: Option<String>,
    last_reply: Option<String>,
    repeat_count: u32,
    last_user_at: DateTime<Utc>,
    last_day: NaiveDate,
}

pub struct Session {
    inner: Mutex<Inner>,
    config: KaiConfig,
    files: DataDir,
    responders: Responders,
    policy: InitiatorPolicy,
    initiated: Notify,
}

fn note_origin<T>(what: &str, loaded: Loaded<T>) -> T {
    match &loaded.origin {
        LoadOrigin::File => tracing::info!("Loaded {} from disk", what),
        LoadOrigin::Missing => tracing::info!("No saved {}, starting fresh", what),
        LoadOrigin::Corrupt(reason) => {
            tracing::warn!("Saved {} unreadable ({}), starting fresh", what, reason)
        }
    }
    loaded.value
}

impl Session {
    /// Open a session over `config.storage.data_dir`, restoring whatever
    /// durable state is there. Never fails on bad files.
    pub fn open(config: KaiConfig, responders: Responders) -> Self {
        let files = DataDir::new(config.storage.data_dir.clone());

        let layers = note_origin("memory", load_or_default(&files.memory()));
        let social = note_origin("social ledger", load_or_default(&files.social()));
        let conversation = note_origin("conversation", load_or_default(&files.conversation()));
        let profile: UserProfile = note_origin("user profile", load_or_default(&files.user_profile()));
        let life = note_origin("life events", load_or_default(&files.life_events()));

        let context = ContextStore::from_parts(config.context.max_history, conversation, profile);
        let boundary =
            BoundaryEngine::seeded(config.boundary.clone(), context.profile().boundary_violations);
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let now = Utc::now();

        let inner = Inner {
            engine: EmotionEngine::new(config.emotion.clone()),
            memory: MemoryStore::from_layers(config.memory.clone(), layers),
            personality: PersonalityAdapter::new(config.personality.clone()),
            boundary,
            mental: MentalHealth::new(),
            social: SocialLedger::from_doc(config.social.clone(), social),
            context,
            life: LifeEventLog::from_doc(config.context.max_life_events, life),
            humor: HumorEngine::new(),
            inbox: Inbox::new(config.initiator.max_pending),
            rng,
            heavy_topic_mentions: 0,
            current_topic: None,
            last_reply: None,
            repeat_count: 0,
            last_user_at: now,
            last_day: now.date_naive(),
        };

        tracing::info!(
            "Session opened at {} (responder: {})",
            files.root().display(),
            responders.label()
        );

        Self {
            inner: Mutex::new(inner),
            policy: InitiatorPolicy::new(config.initiator.clone()),
            config,
            files,
            responders,
            initiated: Notify::new(),
        }
    }

    pub fn config(&self) -> &KaiConfig {
        &self.config
    }

    /// Run one user turn end to end.
    pub async fn process_message(&self, message: &str) -> TurnOutcome {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;

        // 1. Disengaged: count down and stay out of it
        if inner.boundary.is_disengaged() {
            inner.boundary.step_disengage();
            let reply = inner.boundary.disengage_reply(&mut inner.rng).to_string();
            tracing::debug!("Disengaged, {} turns left", inner.boundary.state().disengaged_left);
            return TurnOutcome {
                reply,
                source: ReplySource::Disengaged,
                emotion: inner.engine.emotion_vector().rounded(),
                hormone_changes: Vec::new(),
                boundary: boundary_flags(&inner.boundary),
                mode: inner.personality.mode(),
                intent: None,
            };
        }

        self.roll_day(inner);
        inner.last_user_at = Utc::now();
        let before = inner.engine.state().clone();

        // 2. Classify
        let mut signals = classify(message);
        let insult = signals.is_insult();
        if insult {
            inner.boundary.record_abuse(signals.insult_type.as_deref());
            if inner.boundary.should_defend() {
                signals.intensity *= 0.25;
            }
        } else {
            inner.boundary.record_positive();
        }
        if signals.event == EventKind::Apology {
            inner.context.record_apology();
        }
        let defending = inner.boundary.should_defend();

        // 3. Emotion, memory, personality
        inner.engine.process_event(signals.event, signals.intensity);
        let felt = inner.engine.emotion_vector();
        if let Some(mem) = inner.memory.store(message, MEMORY_CONTEXT, &felt, 0.5, 1.0) {
            inner.personality.update_from_memory(&mem.emotion, mem.weight);
        }
        if mentions_heavy_topic(message) {
            inner.heavy_topic_mentions += 1;
        }
        let topic_fatigue = inner.heavy_topic_mentions > TOPIC_FATIGUE_AFTER;

        // 4. Engagement over the last few user messages
        let previous = inner.context.recent_user_messages(WINDOW - 1);
        let engagement = assess(message, &previous);

        // 5. Social contact and loneliness feedback
        if insult {
            inner.social.on_contact(USER, false, 0.03);
        } else {
            let s = if engagement.disable_affection { 0.02 } else { 0.05 };
            inner.social.on_contact(USER, true, s);
        }
        inner.engine.blend_loneliness(
            inner.social.loneliness_factor(),
            self.config.social.loneliness_smoothing,
        );

        // 6. Oxytocin
        let bonding_blocked = matches!(signals.event, EventKind::Insult | EventKind::BoundaryPush)
            || engagement.disable_affection;
        if !bonding_blocked {
            inner.engine.adjust(&[(Scalar::Oxytocin, 0.05)]);
        }
        if defending && insult {
            inner.engine.adjust(&[(Scalar::Oxytocin, -0.05)]);
        }

        // 7. Clamp, attachment decay, regulation
        inner.engine.clamp();
        inner.engine.per_turn_attachment_decay();
        inner.engine.regulate();

        // 8. Secure attachment: leaving a stable relationship is not a threat
        if signals.leaving
            && inner.social.user_trust() > 0.6
            && inner.context.profile().boundary_violations == 0
        {
            inner
                .engine
                .adjust(&[(Scalar::Amygdala, -0.1), (Scalar::Loneliness, -0.1)]);
        }

        // 9. Ambient noise
        inner.engine.micro_drift(&mut inner.rng);
        inner.engine.clamp();

        // 10. Wellbeing
        let emotion = inner.engine.emotion_vector();
        inner.mental.update_from_emotions(&emotion);
        inner.mental.check_healing_mode();
        if inner.mental.check_self_soothing(&emotion) {
            MentalHealth::apply_recovery(&mut inner.engine);
        }

        // 11. Coping
        let regulation = coping::regulate(&mut inner.engine, insult, &mut inner.rng);

        // Humor only once coping has had its say
        let humor = inner.humor.check(message, &emotion, regulation.is_some());

        // 12. Mode
        let state = inner.engine.state().clone();
        let mode = inner.personality.select_mode(ModeSignals {
            stress: inner.mental.index.stress,
            confidence: inner.personality.state().traits.confidence,
            happiness: 1.0 - state.loneliness,
            energy: 1.0 - state.cortisol,
            responsibility: 0.3,
            crisis: false,
        });

        // 13. Willingness
        let willing_to_talk =
            inner.rng.gen::<f32>() < 0.68 + 0.18 * state.loneliness.min(1.0);

        // 14. Snapshot
        let emotion = inner.engine.emotion_vector();
        if let Some(topic) = extract_topic(message) {
            inner.current_topic = Some(topic);
        }
        let mut recent_user = inner.context.recent_user_messages(WINDOW - 1);
        recent_user.push(message.to_string());
        let length = reply_length(message, &emotion, &recent_user);
        let intent = detect_intent(message);

        let snapshot = TurnSnapshot {
            mode,
            mode_behavior: mode.behavior().to_string(),
            hormones: state,
            emotion,
            intent: Some(intent),
            regulation,
            recent_memories: inner
                .memory
                .recall(Some(&emotion), None, 3)
                .into_iter()
                .map(|m| m.event)
                .collect(),
            recent_life_events: inner.life.recent_descriptions(3),
            conversation_context: inner.context.context_for_llm(CONTEXT_TURNS),
            current_topic: inner.current_topic.clone(),
            user_trust: inner.social.user_trust(),
            user_apologies: inner.context.profile().apologies,
            user_violations: inner.context.profile().boundary_violations,
            boundary: boundary_flags(&inner.boundary),
            engagement: engagement.clone(),
            self_soothing: inner.mental.self_soothing,
            healing_mode: inner.mental.healing_mode,
            willing_to_talk,
            length: length.clone(),
            humor,
            topic_saturation: topic_fatigue.then(|| TOPIC_SATURATION_NOTE.to_string()),
        };

        // Reply ladder
        let b = &inner.boundary;
        let (reply, mut source) = if engagement.minimal {
            (minimal_reply(willing_to_talk, &mut inner.rng).to_string(), ReplySource::Minimal)
        } else if engagement.switch_topic {
            (
                switch_topic_reply(willing_to_talk, &mut inner.rng).to_string(),
                ReplySource::SwitchTopic,
            )
        } else if topic_fatigue {
            inner.heavy_topic_mentions = 0;
            (topic_fatigue_reply(&mut inner.rng).to_string(), ReplySource::TopicFatigue)
        } else if insult && b.has_harassment_pattern() {
            (b.harassment_reply().to_string(), ReplySource::Harassment)
        } else if insult && b.should_defend() {
            (b.defense_reply(&mut inner.rng).to_string(), ReplySource::Boundary)
        } else if !insult && !signals.leaving && b.is_cooldown() {
            (b.cooldown_reply(&mut inner.rng).to_string(), ReplySource::Cooldown)
        } else {
            // A playful opening that would otherwise go to the model gets a witty line instead
            let to_model = self.responders.model_for(intent).is_some();
            let witty = playful_intent(message).filter(|_| to_model && humor.active);
            if let Some(playful) = witty {
                (humor_reply(playful, &mut inner.rng).to_string(), ReplySource::Humor)
            } else {
                if !to_model && intent == Intent::EverythingOkay && snapshot.feeling_low() {
                    inner.mental.step_self_soothing();
                }
                let anchored = anchor_to_topic(message, inner.current_topic.as_deref());
                self.respond(intent, &anchored, &snapshot).await
            }
        };

        // Trim, then strip empty "keep it simple" promises on one-liners
        let mut reply = trim_reply(&reply, length.max_sentences);
        if length.style == ReplyStyle::Casual && length.max_sentences <= 1 {
            if let Some(phrase) = SIMPLE_PHRASES.iter().find(|p| reply.contains(*p)) {
                reply = trim_reply(reply.replace(phrase, "").trim(), 1);
            }
        }

        // Loop breaker
        if inner.last_reply.as_deref() == Some(reply.as_str()) {
            inner.repeat_count += 1;
        } else {
            inner.repeat_count = 0;
        }
        if inner.repeat_count >= 2 {
            reply = LOOP_BREAKER_REPLY.to_string();
            source = ReplySource::LoopBreaker;
            inner.repeat_count = 0;
        }
        inner.last_reply = Some(reply.clone());

        // Record and persist
        let emotion_stat = inner.engine.emotion_vector().rounded();
        let hormone_changes = inner.engine.changes_since(&before);
        inner.context.append_turn(message, &reply, emotion_stat);
        let trust = inner.social.user_trust();
        let harassment = inner.boundary.has_harassment_pattern();
        let violations = inner.boundary.abuse_count();
        inner.context.update_profile(violations, trust, harassment);
        self.save(inner);

        tracing::debug!(
            "Turn done: source={:?} intent={:?} mode={} abuse={}",
            source,
            intent,
            mode.as_str(),
            violations
        );

        TurnOutcome {
            reply,
            source,
            emotion: emotion_stat,
            hormone_changes,
            boundary: boundary_flags(&inner.boundary),
            mode,
            intent: Some(intent),
        }
    }

    async fn respond(
        &self,
        intent: Intent,
        message: &str,
        snapshot: &TurnSnapshot,
    ) -> (String, ReplySource) {
        let responder = self.responders.route(intent);
        let limit = Duration::from_secs(self.config.responder.timeout_secs.max(1));
        match tokio::time::timeout(limit, responder.respond(message, snapshot)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => (text, ReplySource::Responder),
            Ok(Ok(_)) => {
                tracing::warn!("Responder {} returned an empty reply", responder.name());
                (FALLBACK_REPLY.to_string(), ReplySource::Fallback)
            }
            Ok(Err(e)) => {
                tracing::warn!("Responder {} failed: {:#}", responder.name(), e);
                (FALLBACK_REPLY.to_string(), ReplySource::Fallback)
            }
            Err(_) => {
                tracing::warn!("Responder {} timed out after {:?}", responder.name(), limit);
                (FALLBACK_REPLY.to_string(), ReplySource::Fallback)
            }
        }
    }

    /// Read-only status. Never touches recall counters or the day clock,
    /// so two calls without a turn in between are identical.
    pub async fn status(&self) -> Status {
        let inner = self.inner.lock().await;
        let mental = &inner.mental;
        Status {
            mode: inner.personality.mode(),
            emotion: inner.engine.emotion_vector().rounded(),
            hormones: inner.engine.state().clone(),
            personality: inner.personality.state().clone(),
            mental: MentalSummary {
                overall: mental.index.overall(),
                index: mental.index.clone(),
                healing_mode: mental.healing_mode,
                self_soothing: mental.self_soothing,
                low_mood_turns: mental.low_mood_turns,
            },
            social: SocialSummary {
                loneliness_factor: inner.social.loneliness_factor(),
                relationships: inner.social.relationships().cloned().collect(),
            },
            boundary: boundary_flags(&inner.boundary),
            context: ContextSummary {
                turns: inner.context.history().len(),
                profile: inner.context.profile().clone(),
                current_topic: inner.current_topic.clone(),
                recent_memories: inner.memory.peek_recent(3),
                recent_life_events: inner.life.recent_descriptions(5),
            },
            memory: inner.memory.counts(),
            humor_level: inner.humor.level(),
            pending: inner.inbox.len(),
            responder: self.responders.label(),
        }
    }

    /// Take every queued unprompted message, oldest first.
    pub async fn drain_pending(&self) -> Vec<PendingMessage> {
        self.inner.lock().await.inbox.drain()
    }

    /// Resolves when an unprompted message has been queued.
    pub async fn initiated(&self) {
        self.initiated.notified().await
    }

    /// One initiator pass. Returns the queued message if Kai reached out.
    pub async fn initiate_once(&self) -> Option<PendingMessage> {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;

        let seconds_since_user = (Utc::now() - inner.last_user_at).num_seconds().max(0) as u64;
        let signals = InitiatorSignals {
            seconds_since_user,
            pending: inner.inbox.len(),
            self_soothing: inner.mental.self_soothing,
            low_mood_turns: inner.mental.low_mood_turns,
            loneliness: inner.engine.state().loneliness,
        };
        let reason = self.policy.should_initiate(&signals, &mut inner.rng)?;

        let life = &mut inner.life;
        let message = self.policy.compose(reason, &mut inner.rng, |rng| {
            Some(life.generate(rng).description.clone())
        });
        if reason.is_self_soothing() {
            inner.mental.step_self_soothing();
            MentalHealth::apply_recovery(&mut inner.engine);
        }

        let pending = PendingMessage {
            message: message.clone(),
            emotion: inner.engine.emotion_vector().rounded(),
            timestamp: Utc::now(),
            reason,
        };
        inner.inbox.push(pending.clone());
        inner.context.append_turn(INITIATED_MARKER, &message, pending.emotion);
        self.save(inner);

        tracing::info!("Kai reached out ({:?}): {}", reason, message);
        self.initiated.notify_one();
        Some(pending)
    }

    /// Start the background initiator. The task holds only a weak
    /// reference and ends once the session is dropped.
    pub fn spawn_initiator(self: &Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        let cfg = &self.config.initiator;
        if !cfg.enabled {
            tracing::info!("Initiator disabled");
            return None;
        }
        let period = Duration::from_secs(cfg.interval_secs.max(1));
        let weak: Weak<Session> = Arc::downgrade(self);
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick fires immediately; nobody wants a message at startup.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(session) = weak.upgrade() else {
                    tracing::debug!("Session dropped, initiator stopping");
                    break;
                };
                session.initiate_once().await;
            }
        }))
    }

    /// Persist every durable store now.
    pub async fn flush(&self) -> Result<()> {
        let inner = self.inner.lock().await;
        self.try_save(&inner)
    }

    fn save(&self, inner: &Inner) {
        if let Err(e) = self.try_save(inner) {
            tracing::warn!("Failed to persist session state: {:#}", e);
        }
    }

    // No cross-file transaction: a crash between writes can leave the
    // stores out of step with each other.
    fn try_save(&self, inner: &Inner) -> Result<()> {
        save_json(&self.files.memory(), inner.memory.layers())?;
        save_json(&self.files.social(), &inner.social.to_doc())?;
        save_json(&self.files.conversation(), &inner.context.to_doc())?;
        save_json(&self.files.user_profile(), inner.context.profile())?;
        save_json(&self.files.life_events(), &inner.life.to_doc())?;
        Ok(())
    }

    /// Daily housekeeping when the calendar day has changed since the last turn.
    fn roll_day(&self, inner: &mut Inner) {
        let today = Utc::now().date_naive();
        let days = (today - inner.last_day).num_days();
        if days <= 0 {
            return;
        }
        for _ in 0..days.min(30) {
            inner.engine.tick();
        }
        inner.social.tick(days as f32);
        inner.memory.consolidate(self.config.memory.consolidation_decay);
        inner.last_day = today;
        tracing::info!("New day: applied {} day(s) of decay", days);
    }
}

pub fn boundary_flags(b: &BoundaryEngine) -> BoundaryFlags {
    let s = b.state();
    BoundaryFlags {
        abuse_count: s.abuse_count,
        defense_mode: s.defense_mode,
        cooldown: s.cooldown,
        toxic_session: s.toxic_session,
        disengaged_left: s.disengaged_left,
        harassment_pattern: b.has_harassment_pattern(),
    }
}
