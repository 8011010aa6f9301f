//! A2A client — submits tasks to a peer agent

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::protocol::*;

/// A2A client for communicating with a peer agent
#[derive(Clone)]
pub struct A2aClient {
    http: Client,
}

impl Default for A2aClient {
    fn default() -> Self {
        Self::new()
    }
}

impl A2aClient {
    pub fn new() -> Self {
        Self {
            http: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// Fetch an agent's capability card from the well-known path.
    pub async fn fetch_agent_card(&self, base_url: &str) -> Result<AgentCard> {
        let url = format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            AGENT_CARD_WELL_KNOWN_PATH
        );
        debug!("Fetching agent card from {}", url);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to connect to agent at {}", url))?;

        if !resp.status().is_success() {
            return Err(anyhow!("Agent card request failed: HTTP {}", resp.status()));
        }

        let card: AgentCard = resp.json().await.context("Failed to parse agent card")?;

        info!(
            "Fetched agent card: {} ({} capabilities)",
            card.name,
            card.capabilities.len()
        );
        Ok(card)
    }

    /// Submit a task to a peer agent
    pub async fn submit_task(&self, base_url: &str, prompt: &str, context: Value) -> Result<TaskResponse> {
        let url = format!("{}/a2a/tasks", base_url.trim_end_matches('/'));
        debug!("Submitting task to {}", url);

        let request = TaskRequest {
            prompt: prompt.to_string(),
            context,
        };

        let resp = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to submit task to {}", url))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Task submission failed: HTTP {} — {}", status, body));
        }

        let task: TaskResponse = resp.json().await.context("Failed to parse task response")?;

        info!("Task submitted: {} (status: {})", task.task_id, task.status);
        Ok(task)
    }

    /// Poll task status
    pub async fn get_task_status(&self, base_url: &str, task_id: &str) -> Result<TaskResponse> {
        let url = format!("{}/a2a/tasks/{}", base_url.trim_end_matches('/'), task_id);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to poll task {} at {}", task_id, url))?;

        if !resp.status().is_success() {
            return Err(anyhow!("Task status request failed: HTTP {}", resp.status()));
        }

        resp.json().await.context("Failed to parse task status")
    }

    /// Cancel a task
    pub async fn cancel_task(&self, base_url: &str, task_id: &str) -> Result<()> {
        let url = format!("{}/a2a/tasks/{}", base_url.trim_end_matches('/'), task_id);

        let resp = self
            .http
            .delete(&url)
            .send()
            .await
            .with_context(|| format!("Failed to cancel task {} at {}", task_id, url))?;

        if !resp.status().is_success() {
            return Err(anyhow!("Task cancellation failed: HTTP {}", resp.status()));
        }

        info!("Task {} cancelled", task_id);
        Ok(())
    }

    /// Submit a task and poll until it reaches a terminal status or the
    /// deadline passes. On timeout the task is cancelled on the peer,
    /// best effort, so it does not keep burning resources there.
    pub async fn submit_and_wait(
        &self,
        base_url: &str,
        prompt: &str,
        context: Value,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<TaskResponse> {
        let task = self.submit_task(base_url, prompt, context).await?;
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if tokio::time::Instant::now() > deadline {
                if let Err(e) = self.cancel_task(base_url, &task.task_id).await {
                    debug!("Could not cancel timed-out task {}: {}", task.task_id, e);
                }
                return Err(anyhow!("Task {} timed out after {:?}", task.task_id, timeout));
            }

            tokio::time::sleep(poll_interval).await;

            let status = self.get_task_status(base_url, &task.task_id).await?;
            if status.status.is_terminal() {
                return Ok(status);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = A2aClient::new();
        let cloned = client.clone();
        let _ = cloned;
    }

    #[tokio::test]
    async fn test_fetch_agent_card_connection_refused() {
        let client = A2aClient::new();
        let result = client.fetch_agent_card("http://127.0.0.1:1").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_submit_task_connection_refused() {
        let client = A2aClient::new();
        let result = client
            .submit_task("http://127.0.0.1:1", "test prompt", serde_json::json!({}))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_task_status_connection_refused() {
        let client = A2aClient::new();
        let result = client.get_task_status("http://127.0.0.1:1", "task-123").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_cancel_task_connection_refused() {
        let client = A2aClient::new();
        let result = client.cancel_task("http://127.0.0.1:1", "task-123").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_submit_and_wait_timeout_cancels_remote_task() {
        use crate::server::A2aServer;
        use async_trait::async_trait;
        use counsel_core::runtime::{AgentEvent, AgentRuntime, EventStream};
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use tokio::sync::mpsc;

        /// Holds every event sender open so runs never finish.
        struct StallRuntime {
            senders: std::sync::Mutex<Vec<mpsc::Sender<Result<AgentEvent>>>>,
            removed: Arc<AtomicUsize>,
        }

        #[async_trait]
        impl AgentRuntime for StallRuntime {
            async fn create_session(&self, _: &str, _: &str) -> Result<()> {
                Ok(())
            }
            async fn run(&self, _: &str, _: &str, _: &str) -> Result<EventStream> {
                let (tx, rx) = mpsc::channel(1);
                self.senders.lock().unwrap().push(tx);
                Ok(rx)
            }
            async fn remove_session(&self, _: &str) -> Result<()> {
                self.removed.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }

        let removed = Arc::new(AtomicUsize::new(0));
        let server = A2aServer::new(
            AgentCard {
                name: "researcher".to_string(),
                description: "stalls forever".to_string(),
                url: "http://localhost:0".to_string(),
                capabilities: vec![],
            },
            Arc::new(StallRuntime {
                senders: std::sync::Mutex::new(Vec::new()),
                removed: removed.clone(),
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = server.router();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = A2aClient::new();
        let err = client
            .submit_and_wait(
                &format!("http://{addr}"),
                "slow task",
                serde_json::json!({}),
                Duration::from_millis(10),
                Duration::from_millis(50),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));

        // The timeout reached the peer as a cancellation, which tears
        // down the task session.
        for _ in 0..100 {
            if removed.load(Ordering::SeqCst) > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(removed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_agent_card_trailing_slash() {
        let client = A2aClient::new();
        // URL construction with a trailing slash must not double-slash.
        let result = client.fetch_agent_card("http://127.0.0.1:1/").await;
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("connect") || err.contains("Connect") || err.contains("Failed"));
    }
}
