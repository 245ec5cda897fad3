use anyhow::Result;
use async_trait::async_trait;

/// A bot command implementation.
///
/// Receives the raw argument string of a command and produces the one-line
/// reply. Implementations are registered under one or more names and looked
/// up by the dispatcher.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Run the command with the given arguments.
    async fn handle(&self, args: &str) -> Result<String>;
}
