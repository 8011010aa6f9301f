//! counsel-core — the coordinator side of the counselling service
//!
//! Houses the conversation router, the session registry, the agent runtime
//! contract, the tool registry, and the LLM provider bindings. The HTTP
//! surfaces (chat API, A2A task server) live in their own crates and build
//! on the seams defined here.

pub mod agent;
pub mod config;
pub mod logging;
pub mod prompts;
pub mod providers;
pub mod router;
pub mod runtime;
pub mod session;
pub mod tools;
pub mod worker;

pub use agent::LlmAgent;
pub use config::Config;
pub use providers::{GeminiProvider, LlmProvider};
pub use router::ConversationRouter;
pub use runtime::{AgentEvent, AgentRuntime, EventStream};
pub use session::SessionRegistry;
pub use worker::ResearchWorker;
