//! LLM agent — instruction + provider + tools, with per-session history
//!
//! Both roles in the system are instances of this: the counsellor binds
//! the `delegate_research` tool, the researcher binds the store tools.
//! A run executes the tool loop on a spawned task and streams events
//! back; the caller only ever sees [`AgentEvent`]s.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};

use crate::logging::preview;
use crate::providers::{
    ChatBlock, ChatMessage, ChatResponseBlock, ChatRole, LlmProvider, ToolDefinition,
};
use crate::runtime::{AgentEvent, AgentRuntime, EVENT_CHANNEL_CAPACITY, EventStream};
use crate::tools::ToolRegistry;

/// Upper bound on model/tool round-trips within one turn. A model stuck
/// calling tools forever fails the turn instead of looping.
const MAX_TOOL_TURNS: usize = 8;

/// An LLM-backed conversational agent.
pub struct LlmAgent {
    name: String,
    instruction: String,
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    histories: Arc<RwLock<HashMap<String, Vec<ChatMessage>>>>,
}

impl LlmAgent {
    pub fn new(
        name: impl Into<String>,
        instruction: impl Into<String>,
        provider: Arc<dyn LlmProvider>,
        tools: ToolRegistry,
    ) -> Self {
        let name = name.into();
        info!(
            "Agent '{}' created with {} tools (model: {})",
            name,
            tools.len(),
            provider.model()
        );
        Self {
            name,
            instruction: instruction.into(),
            provider,
            tools: Arc::new(tools),
            histories: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl AgentRuntime for LlmAgent {
    async fn create_session(&self, user_id: &str, session_id: &str) -> Result<()> {
        let mut histories = self.histories.write().await;
        if histories.contains_key(session_id) {
            debug!("Session {} already registered", session_id);
            return Ok(());
        }
        debug!("Agent '{}': new session {} (user {})", self.name, session_id, user_id);
        histories.insert(session_id.to_string(), Vec::new());
        Ok(())
    }

    async fn run(&self, _user_id: &str, session_id: &str, message: &str) -> Result<EventStream> {
        {
            let histories = self.histories.read().await;
            if !histories.contains_key(session_id) {
                return Err(anyhow!("Unknown session: {session_id}"));
            }
        }

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let turn = Turn {
            agent: self.name.clone(),
            instruction: self.instruction.clone(),
            provider: self.provider.clone(),
            tools: self.tools.clone(),
            histories: self.histories.clone(),
            session_id: session_id.to_string(),
            message: message.to_string(),
        };
        tokio::spawn(async move {
            if let Err(e) = turn.execute(&tx).await {
                warn!("Agent turn failed: {e:#}");
                let _ = tx.send(Err(e)).await;
            }
        });
        Ok(rx)
    }

    async fn remove_session(&self, session_id: &str) -> Result<()> {
        if self.histories.write().await.remove(session_id).is_some() {
            debug!("Agent '{}': removed session {}", self.name, session_id);
        }
        Ok(())
    }
}

/// One in-flight turn, moved onto its own task.
struct Turn {
    agent: String,
    instruction: String,
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    histories: Arc<RwLock<HashMap<String, Vec<ChatMessage>>>>,
    session_id: String,
    message: String,
}

impl Turn {
    async fn execute(&self, tx: &mpsc::Sender<Result<AgentEvent>>) -> Result<()> {
        // Work on a local copy; commit back only when the turn succeeds,
        // so a failed turn does not leave half a round-trip in history.
        let mut messages = {
            let histories = self.histories.read().await;
            histories
                .get(&self.session_id)
                .cloned()
                .ok_or_else(|| anyhow!("Unknown session: {}", self.session_id))?
        };
        messages.push(ChatMessage::text(ChatRole::User, &self.message));

        let definitions: Vec<ToolDefinition> = self.tools.definitions();

        for _ in 0..MAX_TOOL_TURNS {
            let response = self
                .provider
                .complete(&self.instruction, &messages, &definitions)
                .await?;

            let mut assistant_blocks = Vec::new();
            let mut tool_results = Vec::new();

            for block in response.blocks {
                match block {
                    ChatResponseBlock::Text { text } => {
                        tx.send(Ok(AgentEvent::text(text.clone()))).await.ok();
                        assistant_blocks.push(ChatBlock::Text { text });
                    }
                    ChatResponseBlock::ToolCall { id, name, input } => {
                        info!("[TOOL CALL] {} ({})", name, self.agent);
                        tx.send(Ok(AgentEvent::Other {
                            kind: format!("tool_call:{name}"),
                        }))
                        .await
                        .ok();

                        // A tool failure goes back to the model as text;
                        // the model decides how to degrade.
                        let content = match self.tools.execute(&name, input.clone()).await {
                            Ok(result) => result,
                            Err(e) => format!("Error: {e:#}"),
                        };
                        debug!("[TOOL RESULT] {}: {}", name, preview(&content, 200));

                        assistant_blocks.push(ChatBlock::ToolCall {
                            id: id.clone(),
                            name: name.clone(),
                            input,
                        });
                        tool_results.push(ChatBlock::ToolResult {
                            call_id: id,
                            name,
                            content,
                        });
                    }
                }
            }

            messages.push(ChatMessage {
                role: ChatRole::Assistant,
                blocks: assistant_blocks,
            });

            if tool_results.is_empty() {
                let mut histories = self.histories.write().await;
                histories.insert(self.session_id.clone(), messages);
                return Ok(());
            }
            messages.push(ChatMessage {
                role: ChatRole::User,
                blocks: tool_results,
            });
        }

        Err(anyhow!(
            "Agent '{}' exceeded {} tool round-trips in one turn",
            self.agent,
            MAX_TOOL_TURNS
        ))
    }
}
