//! A2A (Agent-to-Agent) protocol support
//!
//! The counsellor and the researcher are separate processes talking this
//! protocol: submit a task, poll its status, read its result. This crate
//! carries the wire types, the client side (used by the counsellor's
//! `delegate_research` tool), and the researcher-side task server.

pub mod client;
pub mod protocol;
pub mod server;
pub mod tool;
pub mod worker;

pub use client::A2aClient;
pub use protocol::{AGENT_CARD_WELL_KNOWN_PATH, AgentCard, TaskRequest, TaskResponse, TaskStatus};
pub use server::A2aServer;
pub use tool::DelegateResearchTool;
pub use worker::RemoteResearcher;
