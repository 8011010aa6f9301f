//! Chat API routes

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use counsel_core::ConversationRouter;
use counsel_core::logging::preview;

use crate::protocol::{ChatRequest, ChatResponse};

const VERSION: &str = "2.0.0";

#[derive(Clone)]
struct AppState {
    router: Arc<ConversationRouter>,
}

/// Build the chat API router over a conversation router.
pub fn build_router(conversations: Arc<ConversationRouter>) -> Router {
    // Browser front-ends talk to this directly; allow everything, as the
    // original deployment does.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .route("/", get(root))
        .layer(cors)
        .with_state(AppState {
            router: conversations,
        })
}

/// Bind and serve the chat API until the process exits.
pub async fn serve(conversations: Arc<ConversationRouter>, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Chat API listening on {}", addr);
    axum::serve(listener, build_router(conversations)).await?;
    Ok(())
}

async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    let start = Instant::now();
    info!(
        "[REQUEST] /chat user_id={} message={}",
        request.user_id,
        preview(&request.message, 100)
    );

    match state.router.handle(&request.user_id, &request.message).await {
        Ok(response) => {
            info!(
                "[RESPONSE] /chat ({}ms) {}",
                start.elapsed().as_millis(),
                preview(&response, 100)
            );
            Json(ChatResponse {
                response,
                user_id: request.user_id,
            })
            .into_response()
        }
        Err(e) => {
            error!(
                "Error in chat ({}ms): {:#}",
                start.elapsed().as_millis(),
                e
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": format!("{e:#}") })),
            )
                .into_response()
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "agent": "counsellor",
        "version": VERSION,
    }))
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "name": "Career Counsellor API",
        "version": VERSION,
        "endpoints": {
            "chat": "POST /chat",
            "health": "GET /health",
        }
    }))
}
