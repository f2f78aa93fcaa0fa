use chrono::{DateTime, Utc};
use kai_core::snapshot::BoundaryFlags;
use kai_core::{EmotionVector, HormoneChange, Intent, Mode};
use kai_expression::PendingMessage;
use kai_memory::{ReplySource, TurnOutcome};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inbound chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Caller-supplied id echoed back; generated when absent.
    #[serde(default)]
    pub request_id: Option<Uuid>,
}

impl ChatRequest {
    /// The message with surrounding whitespace removed, or `None` if nothing is left.
    pub fn text(&self) -> Option<&str> {
        let t = self.message.trim();
        (!t.is_empty()).then_some(t)
    }
}

/// Reply to one chat message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub request_id: Uuid,
    pub reply: String,
    pub source: ReplySource,
    /// Name of the strongest emotion after the turn.
    pub dominant_emotion: String,
    pub emotion: EmotionVector,
    pub hormone_changes: Vec<HormoneChange>,
    pub boundary: BoundaryFlags,
    pub mode: Mode,
    pub intent: Option<Intent>,
    pub timestamp: DateTime<Utc>,
}

impl ChatResponse {
    pub fn from_outcome(request_id: Uuid, outcome: TurnOutcome) -> Self {
        let (dominant, _) = outcome.emotion.dominant();
        Self {
            request_id,
            reply: outcome.reply,
            source: outcome.source,
            dominant_emotion: dominant.name().to_string(),
            emotion: outcome.emotion,
            hormone_changes: outcome.hormone_changes,
            boundary: outcome.boundary,
            mode: outcome.mode,
            intent: outcome.intent,
            timestamp: Utc::now(),
        }
    }
}

/// Unprompted messages drained from the session inbox.
#[derive(Debug, Clone, Serialize)]
pub struct InboxResponse {
    pub messages: Vec<PendingMessage>,
}
