//! Chat API request/response bodies

use serde::{Deserialize, Serialize};

fn default_user_id() -> String {
    "default_user".to_string()
}

/// Body of POST /chat.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

/// Successful chat response.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub user_id: String,
}
