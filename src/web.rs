//! HTTP chat server.
//!
//! Three endpoints: POST /session opens a session, GET /greetings
//! returns the opening message, POST /chat answers one turn. Replies are
//! arrays of typed display items the chat front end renders directly.

use std::sync::Arc;

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::signal;

use crate::chat::{ChatError, ChatService};
use crate::present::DisplayItem;

#[derive(Clone)]
struct SharedState {
    chat: Arc<ChatService>,
}

/// Build the router; split out from serving so tests can drive it with
/// `tower::ServiceExt::oneshot`.
pub fn router(chat: Arc<ChatService>) -> Router {
    let shared_state = SharedState { chat };

    Router::new()
        .route("/session", post(create_session))
        .route("/greetings", get(greetings))
        .route("/chat", post(chat_turn))
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(
                    tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO),
                )
                .on_response(
                    tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO),
                ),
        )
        .with_state(shared_state)
}

async fn start_server(chat: ChatService, bind: String) {
    let app = router(Arc::new(chat));

    async fn shutdown_signal() {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
        };

        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install signal handler")
                .recv()
                .await;
        };

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    }

    let listener = tokio::net::TcpListener::bind(&bind).await.unwrap();
    log::info!("listening on {}", bind);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

pub fn start_daemon(chat: ChatService, bind: String) {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(async { start_server(chat, bind).await });
}

// Wraps `ChatError` so axum knows how to render it.
#[derive(Debug)]
struct HttpError(ChatError);

impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        match self.0 {
            ChatError::UnknownSession(_) => (
                axum::http::StatusCode::BAD_REQUEST,
                json!({"error": self.0.to_string()}).to_string(),
            ),
        }
        .into_response()
    }
}

impl From<ChatError> for HttpError {
    fn from(err: ChatError) -> Self {
        Self(err)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
}

async fn create_session(State(state): State<SharedState>) -> Json<SessionResponse> {
    let session_id = state.chat.create_session();
    Json(SessionResponse { session_id })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemsResponse {
    pub items: Vec<DisplayItem>,
}

async fn greetings(State(state): State<SharedState>) -> Json<ItemsResponse> {
    Json(ItemsResponse {
        items: state.chat.greet(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    #[serde(default)]
    pub text: String,
}

async fn chat_turn(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ItemsResponse>, HttpError> {
    log::debug!("chat turn for session {}: {:?}", payload.session_id, payload.text);

    let chat = state.chat.clone();

    // Embedding work is CPU-bound; keep it off the async workers
    tokio::task::block_in_place(move || {
        chat.handle_turn(&payload.session_id, &payload.text)
            .map(|items| Json(ItemsResponse { items }))
            .map_err(Into::into)
    })
}
