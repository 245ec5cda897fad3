use serde::{Deserialize, Serialize};

/// A bot command, used both as the inbound request and the outbound response.
///
/// The dispatcher only ever writes `result`; every other field is carried
/// through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Command {
    /// Who sent the command (nick, user id, ...).
    pub user: String,
    /// Where the command came from (channel, network, ...).
    pub source: String,
    /// Handler name, matched exactly.
    pub command: String,
    /// Everything after the command name, passed verbatim to the handler.
    #[serde(rename = "args")]
    pub arguments: String,
    /// Handler output. Ignored on input.
    pub result: String,
}

impl Command {
    pub fn new(command: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            arguments: arguments.into(),
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}
