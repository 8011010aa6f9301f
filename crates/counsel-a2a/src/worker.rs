//! Remote researcher handle
//!
//! Implements the counsellor's [`ResearchWorker`] seam over the A2A
//! client: one blocking delegation with a bounded timeout. Discovery is a
//! separate one-time step at startup; delegation never depends on it.

use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use counsel_core::logging::preview;
use counsel_core::worker::ResearchWorker;

use crate::client::A2aClient;
use crate::protocol::TaskStatus;

/// How often a delegation polls the researcher for a result.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Handle to the researcher A2A server.
pub struct RemoteResearcher {
    client: A2aClient,
    base_url: String,
    timeout: Duration,
}

impl RemoteResearcher {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: A2aClient::new(),
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One-time startup discovery: fetch and log the researcher's card.
    /// An unreachable researcher at startup is a warning, not a failure;
    /// the real error surfaces on the first delegation that needs it.
    pub async fn connect(&self) {
        info!("Connecting to researcher at: {}", self.base_url);
        match self.client.fetch_agent_card(&self.base_url).await {
            Ok(card) => info!("Researcher '{}' capabilities: {:?}", card.name, card.capabilities),
            Err(e) => warn!("Could not fetch researcher agent card: {} (proceeding anyway)", e),
        }
    }
}

#[async_trait]
impl ResearchWorker for RemoteResearcher {
    async fn delegate(&self, task: &str) -> Result<String> {
        info!("[A2A CALL] researcher: {}", preview(task, 100));

        let response = self
            .client
            .submit_and_wait(&self.base_url, task, json!({}), POLL_INTERVAL, self.timeout)
            .await?;

        match response.status {
            TaskStatus::Completed => {
                let text = response
                    .result
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| anyhow!("Researcher completed task {} without a result", response.task_id))?;
                info!("[A2A RESPONSE] researcher: {} chars", text.len());
                Ok(text)
            }
            TaskStatus::Failed => Err(anyhow!(
                "Researcher task {} failed: {}",
                response.task_id,
                response.result.unwrap_or_else(|| "no detail".to_string())
            )),
            TaskStatus::Cancelled => {
                Err(anyhow!("Researcher task {} was cancelled", response.task_id))
            }
            other => Err(anyhow!(
                "Researcher task {} ended in non-terminal status {}",
                response.task_id,
                other
            )),
        }
    }
}
