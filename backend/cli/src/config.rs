use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use lambdabot_logging::{LogOptions, LogTarget};

/// How requests reach the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Serve invocations from the AWS Lambda runtime API
    Lambda,
    /// Read one JSON command from stdin and print the response to stdout
    Stdout,
}

/// lambdabot process configuration.
#[derive(Debug, Parser)]
#[command(name = "lambdabot")]
#[command(about = "Chat bot command dispatcher")]
#[command(version)]
pub struct Cli {
    /// Transport to serve requests on
    #[arg(long, env = "RUNMODE", value_enum, default_value_t = RunMode::Lambda)]
    pub mode: RunMode,

    /// Log filter used when RUST_LOG does not parse
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Also write daily-rotated JSON logs into this directory
    #[arg(long, env = "LAMBDABOT_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            level: self.log_level.clone(),
            target: match self.mode {
                RunMode::Lambda => LogTarget::Stdout,
                // stdout carries the response document
                RunMode::Stdout => LogTarget::Stderr,
            },
            log_dir: self.log_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdout_mode_logs_to_stderr() {
        let cli = Cli::try_parse_from(["lambdabot", "--mode", "stdout", "--log-level", "debug"])
            .unwrap();
        assert_eq!(cli.mode, RunMode::Stdout);
        let options = cli.log_options();
        assert_eq!(options.target, LogTarget::Stderr);
        assert_eq!(options.level, "debug");
    }

    #[test]
    fn test_lambda_mode_logs_to_stdout() {
        let cli = Cli::try_parse_from(["lambdabot", "--mode", "lambda", "--log-dir", "/tmp/logs"])
            .unwrap();
        let options = cli.log_options();
        assert_eq!(options.target, LogTarget::Stdout);
        assert_eq!(options.log_dir, Some(PathBuf::from("/tmp/logs")));
    }

    #[test]
    fn test_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["lambdabot", "--mode", "carrier-pigeon"]).is_err());
    }
}
