/// Command dispatch: route a command record to its handler.
use lambdabot_core::{BotError, Command};
use tracing::info;

use crate::registry::Registry;

/// Reply used when no handler is registered for a command.
pub fn unknown_command_message(command: &str) -> String {
    format!("Unknown command: {}", command)
}

pub struct Dispatcher {
    registry: Registry,
}

impl Dispatcher {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run the handler registered for `cmd.command` and fill in `cmd.result`.
    ///
    /// An unknown command is answered with a placeholder result, not an error.
    /// A failing handler is returned as `BotError::Handler` with the handler's
    /// error as its source; nothing is retried or logged here.
    pub async fn handle(&self, mut cmd: Command) -> Result<Command, BotError> {
        info!(
            user = %cmd.user,
            source = %cmd.source,
            command = %cmd.command,
            "Handling command"
        );

        let Some(handler) = self.registry.lookup(&cmd.command) else {
            cmd.result = unknown_command_message(&cmd.command);
            return Ok(cmd);
        };

        match handler.handle(&cmd.arguments).await {
            Ok(result) => {
                cmd.result = result;
                Ok(cmd)
            }
            Err(source) => Err(BotError::Handler {
                command: cmd.command,
                arguments: cmd.arguments,
                source,
            }),
        }
    }
}
