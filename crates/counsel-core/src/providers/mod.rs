//! LLM provider abstraction
//!
//! The inference engine is an external collaborator; this module defines
//! the provider-agnostic chat types, the [`LlmProvider`] trait, and the
//! one concrete binding the service ships (Gemini over REST).

pub mod gemini;
pub mod types;

pub use gemini::GeminiProvider;
pub use types::{
    ChatBlock, ChatMessage, ChatResponse, ChatResponseBlock, ChatRole, LlmProvider, StopReason,
    ToolDefinition,
};
