use crate::types::{ChatRequest, ChatResponse, InboxResponse};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use kai_memory::{Session, Status};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

/// Shared state for the route handlers.
#[derive(Clone)]
struct AppState {
    session: Arc<Session>,
}

/// HTTP front end for one session.
///
/// - `POST /chat` runs a turn and returns the reply
/// - `GET /status` returns the read-only session snapshot
/// - `GET /inbox` drains queued unprompted messages
/// - `GET /health` health check
pub struct GatewayServer {
    session: Arc<Session>,
    host: String,
    port: u16,
}

impl GatewayServer {
    pub fn new(session: Arc<Session>, host: &str, port: u16) -> Self {
        Self {
            session,
            host: host.to_string(),
            port,
        }
    }

    pub fn router(&self) -> Router {
        router(self.session.clone())
    }

    /// Bind and serve in a background task.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        let app = self.router();
        let addr = format!("{}:{}", self.host, self.port);
        tokio::spawn(async move {
            let listener = match tokio::net::TcpListener::bind(&addr).await {
                Ok(l) => l,
                Err(e) => {
                    tracing::error!("Gateway failed to bind {}: {}", addr, e);
                    return;
                }
            };
            tracing::info!("Gateway listening on {}", addr);
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Gateway server error: {}", e);
            }
        })
    }
}

fn router(session: Arc<Session>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/status", get(status))
        .route("/inbox", get(inbox))
        .layer(CorsLayer::permissive())
        .with_state(AppState { session })
}

// ============================================================================
// Route handlers
// ============================================================================

async fn health() -> &'static str {
    "ok"
}

/// POST /chat
async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let Some(text) = req.text() else {
        return Err((StatusCode::BAD_REQUEST, "message must not be empty".to_string()));
    };
    let request_id = req.request_id.unwrap_or_else(Uuid::new_v4);
    tracing::debug!("Gateway chat {}", request_id);
    let outcome = state.session.process_message(text).await;
    Ok(Json(ChatResponse::from_outcome(request_id, outcome)))
}

/// GET /status
async fn status(State(state): State<AppState>) -> Json<Status> {
    Json(state.session.status().await)
}

/// GET /inbox
async fn inbox(State(state): State<AppState>) -> Json<InboxResponse> {
    Json(InboxResponse {
        messages: state.session.drain_pending().await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kai_core::config::KaiConfig;
    use kai_memory::{ReplySource, Responders};
    use kai_reasoning::TemplateResponder;

    fn state(dir: &tempfile::TempDir) -> AppState {
        let mut config = KaiConfig::default();
        config.storage.data_dir = dir.path().to_path_buf();
        config.rng_seed = Some(5);
        config.initiator.min_seconds_since_user = 0;
        let responders = Responders::rule_based(Arc::new(TemplateResponder::new(Some(5))));
        AppState {
            session: Arc::new(Session::open(config, responders)),
        }
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn test_chat_runs_a_turn() {
        let dir = tempfile::TempDir::new().unwrap();
        let st = state(&dir);
        let id = Uuid::new_v4();
        let req = ChatRequest {
            message: "  what's your name  ".to_string(),
            request_id: Some(id),
        };
        let Json(resp) = chat(State(st.clone()), Json(req)).await.unwrap();
        assert_eq!(resp.request_id, id);
        assert_eq!(resp.source, ReplySource::Responder);
        assert!(resp.reply.contains("Kai"));

        let Json(status) = status(State(st)).await;
        assert_eq!(status.context.turns, 1);
    }

    #[tokio::test]
    async fn test_empty_chat_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let st = state(&dir);
        let req = ChatRequest {
            message: " ".to_string(),
            request_id: None,
        };
        let err = chat(State(st.clone()), Json(req)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert_eq!(st.session.status().await.context.turns, 0);
    }

    #[tokio::test]
    async fn test_inbox_drains() {
        let dir = tempfile::TempDir::new().unwrap();
        let st = state(&dir);
        while st.session.initiate_once().await.is_none() {}

        let Json(first) = inbox(State(st.clone())).await;
        assert_eq!(first.messages.len(), 1);
        let Json(second) = inbox(State(st)).await;
        assert!(second.messages.is_empty());
    }

    #[tokio::test]
    async fn test_server_creates() {
        let dir = tempfile::TempDir::new().unwrap();
        let server = GatewayServer::new(state(&dir).session, "127.0.0.1", 0);
        assert_eq!(server.host, "127.0.0.1");
        let _router = server.router();
    }
}
