//! Structured logging for lambdabot.
//!
//! JSON log output for the Lambda and local transports, plus secret scrubbing
//! for strings that end up in log lines.

pub mod logger;
pub mod redact;

pub use logger::{init_logger, LogOptions, LogTarget};
pub use redact::redact_secrets;
