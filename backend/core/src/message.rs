use serde::{Deserialize, Serialize};

use crate::scope::CommandScope;

/// An inbound chat message, reduced to the three facets the dispatcher
/// reads: text, sender, and the enclosing channel group (absent in DMs).
/// The transport owns everything else about the message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub text: String,
    pub sender_id: String,
    /// Server / channel-group id. `None` means a direct message.
    pub channel_id: Option<String>,
}

impl ChatMessage {
    /// A direct message with no enclosing channel group.
    pub fn direct(text: impl Into<String>, sender_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender_id: sender_id.into(),
            channel_id: None,
        }
    }

    /// A message posted in a server channel.
    pub fn in_channel(
        text: impl Into<String>,
        sender_id: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            sender_id: sender_id.into(),
            channel_id: Some(channel_id.into()),
        }
    }

    /// DirectMessage without a channel group, Server otherwise.
    pub fn scope(&self) -> CommandScope {
        if self.channel_id.is_some() {
            CommandScope::Server
        } else {
            CommandScope::DirectMessage
        }
    }

    /// Identity key used for prefix and disable lookups: the channel
    /// group in a server, the sender in a DM.
    pub fn identity(&self) -> &str {
        self.channel_id.as_deref().unwrap_or(&self.sender_id)
    }
}

/// One unit of input to the dispatcher.
#[derive(Debug, Clone)]
pub enum Incoming {
    /// A raw line typed on the process console.
    Console(String),
    /// A message delivered by the chat transport.
    Chat(ChatMessage),
}

impl Incoming {
    pub fn text(&self) -> &str {
        match self {
            Incoming::Console(line) => line,
            Incoming::Chat(message) => &message.text,
        }
    }

    /// Scope this input was invoked from.
    pub fn scope(&self) -> CommandScope {
        match self {
            Incoming::Console(_) => CommandScope::Console,
            Incoming::Chat(message) => message.scope(),
        }
    }
}
