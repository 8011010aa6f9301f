//! A2A task server — the researcher's inbound surface
//!
//! Serves the agent card at the well-known path and a small task API:
//! submit, poll, cancel. Each task runs the agent on its own spawned
//! task; the table keeps the latest `TaskResponse` for polling.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use tokio::sync::RwLock;
use tokio::task::AbortHandle;
use tracing::{info, warn};

use counsel_core::logging::preview;
use counsel_core::router::{EMPTY_RESPONSE_FALLBACK, aggregate};
use counsel_core::runtime::AgentRuntime;

use crate::protocol::*;

/// Synthetic user id for sessions created on behalf of A2A peers.
const A2A_USER_ID: &str = "a2a_peer";

/// How long a finished task stays in the table if nobody retrieves it.
/// Retrieved terminal tasks are dropped immediately; this sweep catches
/// the fire-and-forget ones.
const TASK_RETENTION_SECS: i64 = 600;

struct TaskEntry {
    response: TaskResponse,
    abort: Option<AbortHandle>,
}

struct ServerState {
    card: AgentCard,
    runtime: Arc<dyn AgentRuntime>,
    tasks: RwLock<HashMap<String, TaskEntry>>,
}

/// A2A server wrapping an agent runtime.
pub struct A2aServer {
    state: Arc<ServerState>,
}

impl A2aServer {
    pub fn new(card: AgentCard, runtime: Arc<dyn AgentRuntime>) -> Self {
        Self {
            state: Arc::new(ServerState {
                card,
                runtime,
                tasks: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Build the axum router for this server.
    pub fn router(&self) -> Router {
        Router::new()
            .route(AGENT_CARD_WELL_KNOWN_PATH, get(agent_card))
            .route("/a2a/tasks", post(submit_task))
            .route("/a2a/tasks/{task_id}", get(task_status).delete(cancel_task))
            .with_state(self.state.clone())
    }

    /// Bind and serve until the process exits.
    pub async fn serve(self, addr: SocketAddr) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("A2A server '{}' listening on {}", self.state.card.name, addr);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

async fn agent_card(State(state): State<Arc<ServerState>>) -> Json<AgentCard> {
    Json(state.card.clone())
}

async fn submit_task(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<TaskRequest>,
) -> Response {
    let task_id = uuid::Uuid::new_v4().to_string();
    let session_id = format!("task_{task_id}");
    info!("A2A task {} submitted: {}", task_id, preview(&request.prompt, 100));

    // Each task gets its own session: peers submit independent tasks,
    // not a conversation.
    if let Err(e) = state.runtime.create_session(A2A_USER_ID, &session_id).await {
        warn!("A2A task {} failed to create session: {:#}", task_id, e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("{e:#}"),
            }),
        )
            .into_response();
    }

    let response = TaskResponse {
        task_id: task_id.clone(),
        status: TaskStatus::Working,
        result: None,
        created_at: Utc::now(),
        completed_at: None,
    };

    // Insert before spawning so the worker always finds its entry. The
    // same lock is a chance to sweep out stale finished tasks nobody
    // ever polled for.
    {
        let mut tasks = state.tasks.write().await;
        let cutoff = Utc::now() - chrono::Duration::seconds(TASK_RETENTION_SECS);
        tasks.retain(|_, entry| match entry.response.completed_at {
            Some(done) if entry.response.status.is_terminal() => done > cutoff,
            _ => true,
        });
        tasks.insert(
            task_id.clone(),
            TaskEntry {
                response: response.clone(),
                abort: None,
            },
        );
    }

    let worker_state = state.clone();
    let worker_id = task_id.clone();
    let handle = tokio::spawn(async move {
        let outcome = run_task(&worker_state, &session_id, &request.prompt).await;
        {
            let mut tasks = worker_state.tasks.write().await;
            if let Some(entry) = tasks.get_mut(&worker_id) {
                // Cancelled while we were finishing keeps that verdict.
                if !entry.response.status.is_terminal() {
                    match outcome {
                        Ok(text) => {
                            entry.response.status = TaskStatus::Completed;
                            entry.response.result = Some(text);
                        }
                        Err(e) => {
                            warn!("A2A task {} failed: {:#}", worker_id, e);
                            entry.response.status = TaskStatus::Failed;
                            entry.response.result = Some(format!("{e:#}"));
                        }
                    }
                    entry.response.completed_at = Some(Utc::now());
                    entry.abort = None;
                }
            }
        }
        // The session existed for this one task; drop its history now
        // that the result is recorded.
        if let Err(e) = worker_state.runtime.remove_session(&session_id).await {
            warn!("A2A task {} session cleanup failed: {:#}", worker_id, e);
        }
    });

    let mut tasks = state.tasks.write().await;
    if let Some(entry) = tasks.get_mut(&task_id) {
        if !entry.response.status.is_terminal() {
            entry.abort = Some(handle.abort_handle());
        }
    }

    (StatusCode::OK, Json(response)).into_response()
}

async fn run_task(state: &ServerState, session_id: &str, prompt: &str) -> Result<String> {
    let mut events = state.runtime.run(A2A_USER_ID, session_id, prompt).await?;
    let text = aggregate(&mut events).await?;
    if text.is_empty() {
        return Ok(EMPTY_RESPONSE_FALLBACK.to_string());
    }
    Ok(text)
}

async fn task_status(
    State(state): State<Arc<ServerState>>,
    Path(task_id): Path<String>,
) -> Response {
    let mut tasks = state.tasks.write().await;
    match tasks.get(&task_id) {
        Some(entry) => {
            let response = entry.response.clone();
            // A terminal status is the last thing a poller needs from
            // this entry; drop it rather than hold it forever.
            if response.status.is_terminal() {
                tasks.remove(&task_id);
            }
            (StatusCode::OK, Json(response)).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Unknown task: {task_id}"),
            }),
        )
            .into_response(),
    }
}

async fn cancel_task(
    State(state): State<Arc<ServerState>>,
    Path(task_id): Path<String>,
) -> Response {
    let response = {
        let mut tasks = state.tasks.write().await;
        match tasks.get_mut(&task_id) {
            Some(entry) => {
                if !entry.response.status.is_terminal() {
                    if let Some(abort) = entry.abort.take() {
                        abort.abort();
                    }
                    entry.response.status = TaskStatus::Cancelled;
                    entry.response.completed_at = Some(Utc::now());
                    info!("A2A task {} cancelled", task_id);
                }
                Some(entry.response.clone())
            }
            None => None,
        }
    };

    match response {
        Some(response) => {
            // The aborted worker never gets to clean up its session.
            let session_id = format!("task_{task_id}");
            if let Err(e) = state.runtime.remove_session(&session_id).await {
                warn!("A2A task {} session cleanup failed: {:#}", task_id, e);
            }
            (StatusCode::OK, Json(response)).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Unknown task: {task_id}"),
            }),
        )
            .into_response(),
    }
}
