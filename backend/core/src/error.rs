use thiserror::Error;

/// Top-level error type for lambdabot.
#[derive(Debug, Error)]
pub enum BotError {
    /// A handler ran and reported a failure. `source` is the handler's error as-is.
    #[error("command '{command}' failed")]
    Handler {
        command: String,
        arguments: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
