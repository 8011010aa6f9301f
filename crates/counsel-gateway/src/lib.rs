//! counsel-gateway — the externally-facing chat boundary
//!
//! A thin axum app over [`ConversationRouter`]: one chat endpoint, a
//! liveness endpoint, and a metadata root. Stateless apart from the
//! session bookkeeping the router owns.

pub mod protocol;
pub mod server;

pub use protocol::{ChatRequest, ChatResponse};
pub use server::{build_router, serve};
