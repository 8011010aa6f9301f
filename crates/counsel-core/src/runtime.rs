//! Agent runtime contract
//!
//! The seam between the conversation router and whatever produces the
//! answer (an LLM-backed agent in production, a scripted fake in tests).
//! Responses arrive as an ordered stream of events; the router only ever
//! sees this tagged shape, never the runtime's internal representation.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// One event emitted while an agent composes its answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    /// Text-bearing event; may carry several parts, all of which count.
    Text { parts: Vec<String> },
    /// Anything else (tool activity, state changes). Contributes no text
    /// and does not terminate the stream.
    Other { kind: String },
}

impl AgentEvent {
    /// Convenience constructor for a single-part text event.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text {
            parts: vec![s.into()],
        }
    }
}

/// Ordered stream of agent events. An `Err` item is terminal: the sender
/// closes the channel after it.
pub type EventStream = mpsc::Receiver<Result<AgentEvent>>;

/// Capacity of event channels. Producers block (backpressure) rather than
/// buffer unboundedly if the consumer falls behind.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A conversation runtime: holds per-session state and turns a user
/// message into a stream of response events.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Register a session. Called at most once per session id by the
    /// router; implementations may treat a repeat call as a no-op.
    async fn create_session(&self, user_id: &str, session_id: &str) -> Result<()>;

    /// Run one turn of the conversation within an existing session.
    async fn run(&self, user_id: &str, session_id: &str, message: &str) -> Result<EventStream>;

    /// Drop a session and whatever state the runtime holds for it.
    /// Unknown ids are ignored. Default is a no-op for runtimes that keep
    /// no per-session state.
    async fn remove_session(&self, session_id: &str) -> Result<()> {
        let _ = session_id;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_constructor() {
        let event = AgentEvent::text("hello");
        assert_eq!(
            event,
            AgentEvent::Text {
                parts: vec!["hello".to_string()]
            }
        );
    }

    #[tokio::test]
    async fn test_event_stream_order() {
        let (tx, mut rx) = mpsc::channel::<Result<AgentEvent>>(EVENT_CHANNEL_CAPACITY);
        tx.send(Ok(AgentEvent::text("first"))).await.unwrap();
        tx.send(Ok(AgentEvent::Other {
            kind: "tool_call".to_string(),
        }))
        .await
        .unwrap();
        drop(tx);

        assert_eq!(rx.recv().await.unwrap().unwrap(), AgentEvent::text("first"));
        assert!(matches!(
            rx.recv().await.unwrap().unwrap(),
            AgentEvent::Other { .. }
        ));
        assert!(rx.recv().await.is_none());
    }
}
