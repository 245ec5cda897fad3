//! Local transport: one JSON command on stdin, one JSON response on stdout.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use lambdabot_commands::Dispatcher;
use lambdabot_core::{BotError, Command};

pub async fn run<R: Read, W: Write>(dispatcher: &Dispatcher, input: R, mut output: W) -> Result<()> {
    let cmd: Command = serde_json::from_reader(input)
        .map_err(BotError::from)
        .context("Error parsing JSON input")?;

    let response = dispatcher
        .handle(cmd)
        .await
        .context("Error handling request")?;

    serde_json::to_writer_pretty(&mut output, &response)
        .map_err(BotError::from)
        .context("Error encoding JSON output")?;
    writeln!(output).map_err(BotError::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambdabot_commands::{build_default_dispatcher, HandlerConfig};

    fn dispatcher() -> Dispatcher {
        build_default_dispatcher(&HandlerConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_round_trip() {
        let input = br##"{"user":"shrike","source":"#lambdabot","command":"echo","args":"moi kaikki"}"##;
        let mut output = Vec::new();
        run(&dispatcher(), &input[..], &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.starts_with("{\n  \"user\": \"shrike\""), "{text}");
        assert!(text.ends_with("}\n"));

        let response: Command = serde_json::from_str(&text).unwrap();
        assert_eq!(response.result, "moi kaikki");
        assert_eq!(response.source, "#lambdabot");
        assert_eq!(response.arguments, "moi kaikki");
    }

    #[tokio::test]
    async fn test_unknown_command_succeeds() {
        let mut output = Vec::new();
        run(&dispatcher(), &br#"{"command":"bogus"}"#[..], &mut output)
            .await
            .unwrap();
        let response: Command = serde_json::from_slice(&output).unwrap();
        assert_eq!(response.result, "Unknown command: bogus");
    }

    #[tokio::test]
    async fn test_bad_json() {
        let mut output = Vec::new();
        let err = run(&dispatcher(), &b"not json"[..], &mut output)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Error parsing JSON input");
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_handler_failure() {
        let mut output = Vec::new();
        let err = run(&dispatcher(), &br#"{"command":"sahko2"}"#[..], &mut output)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Error handling request");
        assert!(format!("{err:#}").contains("ENTSOE_API_KEY environment variable not set"));
        assert!(output.is_empty());
    }
}
