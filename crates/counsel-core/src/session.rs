//! Session registry — one session per user, created at most once
//!
//! Sessions are in-memory and live for the process lifetime. There is no
//! eviction and no persistence across restarts; that is a documented
//! limitation of the design, not an oversight.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::runtime::AgentRuntime;

/// A single user's conversation session.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub message_count: u64,
}

/// Derive the session id for a user. One session per user: a user cannot
/// hold two concurrent conversations.
pub fn session_id_for(user_id: &str) -> String {
    format!("session_{user_id}")
}

/// Registry of active sessions, shared across concurrent requests.
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Resolve the session for `user_id`, registering it with the runtime
    /// on first use. The registration happens under the write lock, so
    /// concurrent first messages from the same user result in exactly one
    /// `create_session` call.
    pub async fn ensure(&self, user_id: &str, runtime: &dyn AgentRuntime) -> Result<String> {
        let session_id = session_id_for(user_id);

        {
            let sessions = self.sessions.read().await;
            if sessions.contains_key(&session_id) {
                debug!("Reusing session: {}", session_id);
                return Ok(session_id);
            }
        }

        let mut sessions = self.sessions.write().await;
        // Re-check: another request may have created it between the locks.
        if !sessions.contains_key(&session_id) {
            info!("Creating new session: {}", session_id);
            runtime.create_session(user_id, &session_id).await?;
            sessions.insert(
                session_id.clone(),
                Session {
                    id: session_id.clone(),
                    user_id: user_id.to_string(),
                    created_at: Utc::now(),
                    message_count: 0,
                },
            );
        }
        Ok(session_id)
    }

    /// Record one handled message on a session.
    pub async fn record_activity(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(session_id) {
            session.message_count += 1;
            debug!(
                "Session '{}' activity (messages: {})",
                session_id, session.message_count
            );
        }
    }

    /// Get a session snapshot by id.
    pub async fn get(&self, session_id: &str) -> Option<Session> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Number of active sessions.
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
