//! How Kai shows up in a conversation: engagement tracking, humor,
//! reply-length control and the decision to speak first.

pub mod engagement;
pub mod humor;
pub mod initiator;
pub mod length;

pub use engagement::{
    assess, mentions_heavy_topic, minimal_reply, switch_topic_reply, topic_fatigue_reply,
};
pub use humor::{humor_reply, playful_intent, HumorEngine, PlayfulIntent};
pub use initiator::{InitiateReason, InitiatorPolicy, InitiatorSignals, Inbox, PendingMessage};
pub use length::{reply_length, trim_reply};
