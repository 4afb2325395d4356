use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a command can be invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandScope {
    /// Typed on the host process console (stdin / REPL).
    Console,
    /// One-on-one chat with the bot.
    DirectMessage,
    /// A channel inside a server group.
    Server,
    /// Registered once, valid in both DirectMessage and Server.
    Shared,
}

impl CommandScope {
    /// Whether a command registered under `self` satisfies an invocation
    /// from `invoked`. Shared covers both chat scopes; Console is disjoint
    /// from chat.
    pub fn accepts(self, invoked: CommandScope) -> bool {
        match self {
            CommandScope::Shared => matches!(
                invoked,
                CommandScope::DirectMessage | CommandScope::Server
            ),
            other => other == invoked,
        }
    }

    /// Scopes reached through the chat transport.
    pub fn is_chat(self) -> bool {
        matches!(
            self,
            CommandScope::DirectMessage | CommandScope::Server | CommandScope::Shared
        )
    }

    /// Console commands are never subject to per-identity disabling.
    pub fn disableable(self) -> bool {
        self.is_chat()
    }
}

impl fmt::Display for CommandScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CommandScope::Console => "console",
            CommandScope::DirectMessage => "dm",
            CommandScope::Server => "server",
            CommandScope::Shared => "shared",
        };
        write!(f, "{label}")
    }
}
