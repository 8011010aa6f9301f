//! `delegate_research` tool — the counsellor's handle on the researcher

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use counsel_core::logging::preview;
use counsel_core::tools::{ToolHandler, json_schema};
use counsel_core::worker::ResearchWorker;

/// Tool that forwards a research task to the configured worker.
pub struct DelegateResearchTool {
    worker: Arc<dyn ResearchWorker>,
}

impl DelegateResearchTool {
    pub fn new(worker: Arc<dyn ResearchWorker>) -> Self {
        Self { worker }
    }
}

#[async_trait]
impl ToolHandler for DelegateResearchTool {
    fn name(&self) -> &str {
        "delegate_research"
    }

    fn description(&self) -> &str {
        "Delegate a research task to the researcher agent. The researcher \
         finds verifiable career facts, data, and links, and returns a report."
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "task": {
                    "type": "string",
                    "description": "Specific research task, e.g. 'Find top 5 BSc courses in India with college links and eligibility'"
                }
            }),
            vec!["task"],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let task = input
            .get("task")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow::anyhow!("Missing 'task' parameter"))?;

        debug!("Delegating research task: {}", preview(task, 100));
        self.worker.delegate(task).await
    }
}
