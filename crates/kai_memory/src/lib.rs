pub mod context;
pub mod coordinator;
pub mod layers;
pub mod life;
pub mod persist;
pub mod social;

pub use context::{ContextStore, ConversationTurn, UserProfile, INITIATED_MARKER};
pub use coordinator::{
    ReplySource, Responders, Session, Status, TurnOutcome, FALLBACK_REPLY, LOOP_BREAKER_REPLY,
};
pub use layers::{Layer, Memory, MemoryCounts, MemoryLayers, MemoryStore};
pub use life::{LifeEvent, LifeEventLog};
pub use persist::{DataDir, LoadOrigin, Loaded, PersistError};
pub use social::{Relationship, SocialLedger};
