//! Structured Logger
//!
//! Wraps `tracing` to emit one JSON object per line, with an optional
//! daily-rotated NDJSON file next to the console stream.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, fmt, fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Console stream the JSON lines go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogTarget {
    /// Lambda collects stdout into CloudWatch.
    #[default]
    Stdout,
    /// Local mode keeps stdout for the response document.
    Stderr,
}

#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Filter directive used when `RUST_LOG` is unset (e.g. "info").
    pub level: String,
    pub target: LogTarget,
    /// Directory for `lambdabot.log.YYYY-MM-DD` files, if any.
    pub log_dir: Option<PathBuf>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            target: LogTarget::default(),
            log_dir: None,
        }
    }
}

/// Initialize the global structured logger.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_logger(options: &LogOptions) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&options.level));

    let writer = match options.target {
        LogTarget::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogTarget::Stderr => BoxMakeWriter::new(std::io::stderr),
    };

    let console_layer = fmt::layer()
        .json()
        .with_writer(writer)
        .with_target(false)
        .with_ansi(false);

    let file_layer = options.log_dir.as_ref().map(|dir| {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "lambdabot.log");
        fmt::layer()
            .json()
            .with_writer(file_appender)
            .with_ansi(false)
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}
