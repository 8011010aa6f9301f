//! Store tools bound into the researcher agent

use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;

use counsel_core::tools::{ToolHandler, json_schema};

use crate::ResearchStore;

fn required_str<'a>(input: &'a Value, key: &str) -> Result<&'a str> {
    input
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("Missing '{}' parameter", key))
}

fn optional_str(input: &Value, key: &str) -> String {
    input
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// `save_career_info` — append a finding to the research store.
pub struct SaveCareerInfoTool {
    store: Arc<ResearchStore>,
}

impl SaveCareerInfoTool {
    pub fn new(store: Arc<ResearchStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ToolHandler for SaveCareerInfoTool {
    fn name(&self) -> &str {
        "save_career_info"
    }

    fn description(&self) -> &str {
        "Save career information (title, description, salary range, skills) \
         under an interest topic in the research store."
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "interest": {
                    "type": "string",
                    "description": "Interest topic the finding belongs to (e.g. 'math')"
                },
                "career_title": {
                    "type": "string",
                    "description": "Name of the career or course"
                },
                "description": {
                    "type": "string",
                    "description": "One or two sentences of substance"
                },
                "salary_range": {
                    "type": "string",
                    "description": "Optional salary range"
                },
                "skills": {
                    "type": "string",
                    "description": "Optional comma-separated skills"
                }
            }),
            vec!["interest", "career_title", "description"],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let interest = required_str(&input, "interest")?.to_string();
        let career_title = required_str(&input, "career_title")?.to_string();
        let description = required_str(&input, "description")?.to_string();
        let salary_range = optional_str(&input, "salary_range");
        let skills = optional_str(&input, "skills");

        let store = self.store.clone();
        // File I/O stays off the reactor threads.
        tokio::task::spawn_blocking(move || {
            store
                .save(&interest, &career_title, &description, &salary_range, &skills)
                .map_err(Into::into)
        })
        .await?
    }
}

/// `lookup_career_info` — report everything saved under an interest.
pub struct LookupCareerInfoTool {
    store: Arc<ResearchStore>,
}

impl LookupCareerInfoTool {
    pub fn new(store: Arc<ResearchStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ToolHandler for LookupCareerInfoTool {
    fn name(&self) -> &str {
        "lookup_career_info"
    }

    fn description(&self) -> &str {
        "Look up previously saved career information for an interest topic. \
         Check this before researching from scratch."
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "interest": {
                    "type": "string",
                    "description": "Interest topic to look up (case-insensitive)"
                }
            }),
            vec!["interest"],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let interest = required_str(&input, "interest")?.to_string();

        let store = self.store.clone();
        let report = tokio::task::spawn_blocking(move || store.lookup(&interest)).await?;
        Ok(report)
    }
}
