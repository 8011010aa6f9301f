//! Gemini provider — REST binding to the generateContent endpoint

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;

use super::types::*;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// [`LlmProvider`] backed by the Gemini REST API.
pub struct GeminiProvider {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, model)
    }

    /// Override the endpoint base URL (local mock servers in tests).
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("failed to build HTTP client"),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn request_body(system: &str, messages: &[ChatMessage], tools: &[ToolDefinition]) -> Value {
        let contents: Vec<Value> = messages.iter().map(content_for_message).collect();

        let mut body = json!({
            "system_instruction": { "parts": [{ "text": system }] },
            "contents": contents,
        });

        if !tools.is_empty() {
            let declarations: Vec<Value> = tools
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.input_schema,
                    })
                })
                .collect();
            body["tools"] = json!([{ "functionDeclarations": declarations }]);
        }
        body
    }

    fn parse_response(&self, body: &Value) -> Result<ChatResponse> {
        let candidate = body
            .get("candidates")
            .and_then(|c| c.get(0))
            .ok_or_else(|| anyhow!("Gemini response contained no candidates: {body}"))?;

        let mut blocks = Vec::new();
        let parts = candidate
            .pointer("/content/parts")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        for part in &parts {
            if let Some(text) = part.get("text").and_then(Value::as_str) {
                if !text.is_empty() {
                    blocks.push(ChatResponseBlock::Text {
                        text: text.to_string(),
                    });
                }
            } else if let Some(call) = part.get("functionCall") {
                let name = call
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| anyhow!("functionCall without a name"))?;
                blocks.push(ChatResponseBlock::ToolCall {
                    id: format!("call_{}", uuid::Uuid::new_v4()),
                    name: name.to_string(),
                    input: call.get("args").cloned().unwrap_or(json!({})),
                });
            }
        }

        let has_tool_call = blocks
            .iter()
            .any(|b| matches!(b, ChatResponseBlock::ToolCall { .. }));
        let stop_reason = if has_tool_call {
            StopReason::ToolUse
        } else {
            match candidate.get("finishReason").and_then(Value::as_str) {
                Some("STOP") => StopReason::EndTurn,
                Some("MAX_TOKENS") => StopReason::MaxTokens,
                _ => StopReason::Unknown,
            }
        };

        Ok(ChatResponse {
            blocks,
            stop_reason,
        })
    }
}

/// Map one history message onto a Gemini `contents` entry.
fn content_for_message(message: &ChatMessage) -> Value {
    let role = match message.role {
        ChatRole::User => "user",
        ChatRole::Assistant => "model",
    };
    let parts: Vec<Value> = message
        .blocks
        .iter()
        .map(|block| match block {
            ChatBlock::Text { text } => json!({ "text": text }),
            ChatBlock::ToolCall { name, input, .. } => {
                json!({ "functionCall": { "name": name, "args": input } })
            }
            ChatBlock::ToolResult { name, content, .. } => {
                json!({ "functionResponse": { "name": name, "response": { "result": content } } })
            }
        })
        .collect();
    json!({ "role": role, "parts": parts })
}

#[async_trait::async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(
        &self,
        system: &str,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ChatResponse> {
        if self.api_key.is_empty() {
            return Err(anyhow!("GEMINI_API_KEY is not set"));
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        debug!("Gemini request: {} messages, {} tools", messages.len(), tools.len());

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(system, messages, tools))
            .send()
            .await
            .with_context(|| format!("Failed to reach Gemini at {url}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Gemini request failed: HTTP {status} — {body}"));
        }

        let body: Value = resp.json().await.context("Failed to parse Gemini response")?;
        self.parse_response(&body)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let messages = vec![ChatMessage::text(ChatRole::User, "best courses")];
        let tools = vec![ToolDefinition {
            name: "delegate_research".to_string(),
            description: "Delegate a research task".to_string(),
            input_schema: json!({"type": "object", "properties": {"task": {"type": "string"}}}),
        }];

        let body = GeminiProvider::request_body("be helpful", &messages, &tools);
        assert_eq!(body["system_instruction"]["parts"][0]["text"], "be helpful");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "best courses");
        assert_eq!(
            body["tools"][0]["functionDeclarations"][0]["name"],
            "delegate_research"
        );
    }

    #[test]
    fn test_request_body_without_tools() {
        let messages = vec![ChatMessage::text(ChatRole::User, "hi")];
        let body = GeminiProvider::request_body("sys", &messages, &[]);
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_tool_result_maps_to_function_response() {
        let message = ChatMessage {
            role: ChatRole::User,
            blocks: vec![ChatBlock::ToolResult {
                call_id: "call_1".to_string(),
                name: "lookup_career_info".to_string(),
                content: "no data".to_string(),
            }],
        };
        let content = content_for_message(&message);
        assert_eq!(
            content["parts"][0]["functionResponse"]["name"],
            "lookup_career_info"
        );
        assert_eq!(
            content["parts"][0]["functionResponse"]["response"]["result"],
            "no data"
        );
    }

    #[test]
    fn test_parse_text_response() {
        let provider = GeminiProvider::new("key", "gemini-flash-latest");
        let body = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Here is my advice." }] },
                "finishReason": "STOP"
            }]
        });
        let resp = provider.parse_response(&body).unwrap();
        assert_eq!(resp.stop_reason, StopReason::EndTurn);
        assert_eq!(resp.blocks.len(), 1);
        match &resp.blocks[0] {
            ChatResponseBlock::Text { text } => assert_eq!(text, "Here is my advice."),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_function_call_response() {
        let provider = GeminiProvider::new("key", "gemini-flash-latest");
        let body = json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "Let me look that up." },
                    { "functionCall": { "name": "delegate_research", "args": { "task": "find courses" } } }
                ]},
                "finishReason": "STOP"
            }]
        });
        let resp = provider.parse_response(&body).unwrap();
        assert!(resp.stop_reason.is_tool_use());
        assert_eq!(resp.blocks.len(), 2);
        match &resp.blocks[1] {
            ChatResponseBlock::ToolCall { name, input, .. } => {
                assert_eq!(name, "delegate_research");
                assert_eq!(input["task"], "find courses");
            }
            other => panic!("expected tool call, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_empty_candidates_is_error() {
        let provider = GeminiProvider::new("key", "gemini-flash-latest");
        assert!(provider.parse_response(&json!({"candidates": []})).is_err());
    }

    #[tokio::test]
    async fn test_missing_api_key_rejected_before_network() {
        let provider = GeminiProvider::new("", "gemini-flash-latest");
        let err = provider.complete("sys", &[], &[]).await.unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
