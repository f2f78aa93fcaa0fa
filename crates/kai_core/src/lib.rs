pub mod config;
pub mod dynamics;
pub mod emotion;
pub mod persona;
pub mod sentiment;
pub mod snapshot;
pub mod state;

pub use config::KaiConfig;
pub use dynamics::{EmotionEngine, EventKind};
pub use emotion::{Emotion, EmotionVector};
pub use persona::{Mode, ModeSignals, PersonalityAdapter, PersonalityState};
pub use sentiment::{classify, detect_intent, Intent, MessageSignals};
pub use snapshot::{
    HumorSignals, LengthHint, RegulationDirective, ReplyStyle, ReplyTone, TurnSnapshot,
};
pub use state::{EmotionalState, HormoneChange, Scalar};

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;

/// Pick one line from a fixed pool. Empty pools yield an empty string.
pub fn pick<R: Rng + ?Sized>(rng: &mut R, pool: &[&'static str]) -> &'static str {
    pool.choose(rng).copied().unwrap_or_default()
}

/// Turns a user message plus the current state snapshot into reply text.
///
/// Implementations live outside the simulation core. They may fail or be
/// slow; the caller time-boxes them and falls back to a fixed reply.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, message: &str, snapshot: &TurnSnapshot) -> anyhow::Result<String>;

    /// Short label for logs and status output.
    fn name(&self) -> &'static str;

    /// Whether this backend should see open-ended intents. Rule-based
    /// responders return false so every intent stays in-character.
    fn handles_open_ended(&self) -> bool {
        false
    }
}
