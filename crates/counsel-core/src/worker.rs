//! Delegation seam
//!
//! The counsellor never talks to the researcher transport directly; it
//! goes through this trait so the A2A client can be swapped for an
//! in-process fake in tests, or a different transport entirely.

use anyhow::Result;
use async_trait::async_trait;

/// A remote specialist that accepts a task description and returns a text
/// result. Delegation is a blocking request with a bounded timeout owned
/// by the implementation.
#[async_trait]
pub trait ResearchWorker: Send + Sync {
    async fn delegate(&self, task: &str) -> Result<String>;
}
