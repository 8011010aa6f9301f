//! Conversation router — session resolution and fragment aggregation
//!
//! The router does no reasoning of its own. It resolves the caller's
//! session, hands the message to the agent runtime, and concatenates the
//! resulting text fragments in emission order.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::runtime::{AgentEvent, AgentRuntime, EventStream};
use crate::session::SessionRegistry;

/// Returned when the agent produced no text at all. Callers never see an
/// empty string as a successful result.
pub const EMPTY_RESPONSE_FALLBACK: &str =
    "I'm sorry, I couldn't generate a response. Please try again.";

/// Routes chat messages to the agent runtime, one session per user.
pub struct ConversationRouter {
    runtime: Arc<dyn AgentRuntime>,
    sessions: SessionRegistry,
}

impl ConversationRouter {
    pub fn new(runtime: Arc<dyn AgentRuntime>) -> Self {
        Self {
            runtime,
            sessions: SessionRegistry::new(),
        }
    }

    /// Handle one user message: resolve the session, run the agent, and
    /// return the aggregated response text.
    ///
    /// Failures while registering the session or consuming the event
    /// stream surface as a single error; any partially aggregated text is
    /// discarded. Session state is unaffected by a failed run.
    pub async fn handle(&self, user_id: &str, message: &str) -> Result<String> {
        let session_id = self
            .sessions
            .ensure(user_id, self.runtime.as_ref())
            .await
            .context("failed to resolve session")?;

        info!("Starting agent run for session: {}", session_id);

        let mut events = self.runtime.run(user_id, &session_id, message).await?;
        let response_text = aggregate(&mut events).await?;

        self.sessions.record_activity(&session_id).await;

        if response_text.is_empty() {
            warn!("Empty response from agent");
            return Ok(EMPTY_RESPONSE_FALLBACK.to_string());
        }
        Ok(response_text)
    }

    /// The session registry, for introspection (health, tests).
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }
}

/// Drain an event stream and concatenate every text part in emission
/// order. Textless events contribute nothing and do not end the stream.
/// An `Err` item aborts aggregation; whatever text was already gathered
/// is discarded with it.
pub async fn aggregate(events: &mut EventStream) -> Result<String> {
    let mut text = String::new();
    let mut event_count = 0u64;
    while let Some(event) = events.recv().await {
        event_count += 1;
        match event? {
            AgentEvent::Text { parts } => {
                for part in parts {
                    text.push_str(&part);
                }
            }
            AgentEvent::Other { kind } => {
                debug!("Event {}: {} (no text)", event_count, kind);
            }
        }
    }
    info!("Agent run complete. Events: {}", event_count);
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    /// Replays a fixed event script on every run.
    struct ScriptedRuntime {
        script: Vec<Result<AgentEvent, String>>,
        creations: AtomicUsize,
    }

    impl ScriptedRuntime {
        fn new(script: Vec<Result<AgentEvent, String>>) -> Self {
            Self {
                script,
                creations: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AgentRuntime for ScriptedRuntime {
        async fn create_session(&self, _: &str, _: &str) -> Result<()> {
            self.creations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn run(&self, _: &str, _: &str, _: &str) -> Result<EventStream> {
            let (tx, rx) = mpsc::channel(16);
            let script = self.script.clone();
            tokio::spawn(async move {
                for item in script {
                    let item = item.map_err(|e| anyhow!(e));
                    if tx.send(item).await.is_err() {
                        break;
                    }
                }
            });
            Ok(rx)
        }
    }

    fn router(script: Vec<Result<AgentEvent, String>>) -> ConversationRouter {
        ConversationRouter::new(Arc::new(ScriptedRuntime::new(script)))
    }

    #[tokio::test]
    async fn test_fragments_concatenated_in_emission_order() {
        let router = router(vec![
            Ok(AgentEvent::text("A")),
            Ok(AgentEvent::Other {
                kind: "tool_call".to_string(),
            }),
            Ok(AgentEvent::text("B")),
            Ok(AgentEvent::Other {
                kind: "state_delta".to_string(),
            }),
            Ok(AgentEvent::text("C")),
        ]);

        let result = router.handle("u1", "hello").await.unwrap();
        assert_eq!(result, "ABC");
    }

    #[tokio::test]
    async fn test_multi_part_events() {
        let router = router(vec![Ok(AgentEvent::Text {
            parts: vec!["A".to_string(), "B".to_string()],
        })]);
        assert_eq!(router.handle("u1", "hi").await.unwrap(), "AB");
    }

    #[tokio::test]
    async fn test_empty_stream_yields_fallback() {
        let router = router(vec![]);
        let result = router.handle("u1", "hello").await.unwrap();
        assert_eq!(result, EMPTY_RESPONSE_FALLBACK);
        assert!(!result.is_empty());
    }

    #[tokio::test]
    async fn test_textless_stream_yields_fallback() {
        let router = router(vec![
            Ok(AgentEvent::Other {
                kind: "a".to_string(),
            }),
            Ok(AgentEvent::Other {
                kind: "b".to_string(),
            }),
        ]);
        assert_eq!(
            router.handle("u1", "hello").await.unwrap(),
            EMPTY_RESPONSE_FALLBACK
        );
    }

    #[tokio::test]
    async fn test_stream_error_discards_partial_output() {
        let router = router(vec![
            Ok(AgentEvent::text("partial")),
            Err("inference backend unavailable".to_string()),
        ]);

        let err = router.handle("u1", "hello").await.unwrap_err();
        assert!(err.to_string().contains("inference backend unavailable"));
    }

    #[tokio::test]
    async fn test_session_reused_across_turns() {
        let runtime = Arc::new(ScriptedRuntime::new(vec![Ok(AgentEvent::text("ok"))]));
        let router = ConversationRouter::new(runtime.clone());

        router.handle("u1", "first").await.unwrap();
        router.handle("u1", "second").await.unwrap();

        assert_eq!(runtime.creations.load(Ordering::SeqCst), 1);
        let session = router.sessions().get("session_u1").await.unwrap();
        assert_eq!(session.message_count, 2);
    }

    #[tokio::test]
    async fn test_failed_run_leaves_session_usable() {
        struct FlakyRuntime {
            runs: AtomicUsize,
        }

        #[async_trait]
        impl AgentRuntime for FlakyRuntime {
            async fn create_session(&self, _: &str, _: &str) -> Result<()> {
                Ok(())
            }
            async fn run(&self, _: &str, _: &str, _: &str) -> Result<EventStream> {
                if self.runs.fetch_add(1, Ordering::SeqCst) == 0 {
                    anyhow::bail!("timed out");
                }
                let (tx, rx) = mpsc::channel(1);
                tx.send(Ok(AgentEvent::text("recovered"))).await.ok();
                Ok(rx)
            }
        }

        let router = ConversationRouter::new(Arc::new(FlakyRuntime {
            runs: AtomicUsize::new(0),
        }));

        assert!(router.handle("u1", "first").await.is_err());
        // Same session, next turn succeeds.
        assert_eq!(router.handle("u1", "second").await.unwrap(), "recovered");
        assert_eq!(router.sessions().count().await, 1);
    }
}
