/// Command, callback, and resolve-result types.
use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use botkit_core::{ChatMessage, CommandScope};

// ---------------------------------------------------------------------------
// Handler traits
// ---------------------------------------------------------------------------

/// Context handed to chat handlers: the triggering message plus the
/// identity key its settings are stored under.
#[derive(Debug, Clone)]
pub struct ChatContext {
    pub message: ChatMessage,
    /// Channel-group id in a server, sender id in a DM.
    pub identity: String,
}

impl ChatContext {
    pub fn from_message(message: &ChatMessage) -> Self {
        Self {
            identity: message.identity().to_string(),
            message: message.clone(),
        }
    }
}

/// The reply produced by a handler — text to send back to the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub text: String,
    /// Only visible to the invoker, where the transport supports it.
    pub ephemeral: bool,
}

impl CommandReply {
    pub fn ok(text: impl Into<String>) -> Self {
        Self { text: text.into(), ephemeral: false }
    }
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self { text: text.into(), ephemeral: true }
    }
}

/// Handler for console-scope commands: args only, no message context.
#[async_trait]
pub trait ConsoleHandler: Send + Sync {
    async fn handle(&self, args: &[String]) -> Result<CommandReply>;
}

/// Handler for chat-scope commands (DM, server, shared).
#[async_trait]
pub trait ChatHandler: Send + Sync {
    async fn handle(&self, ctx: &ChatContext, args: &[String]) -> Result<CommandReply>;
}

// ---------------------------------------------------------------------------
// Callback
// ---------------------------------------------------------------------------

/// Callback attached to a command, tagged by the shape it is invoked
/// with. Registration rejects a callback whose tag does not fit the
/// command's scope.
#[derive(Clone)]
pub enum Callback {
    Console(Arc<dyn ConsoleHandler>),
    Chat(Arc<dyn ChatHandler>),
}

impl Callback {
    pub fn console(handler: impl ConsoleHandler + 'static) -> Self {
        Callback::Console(Arc::new(handler))
    }

    pub fn chat(handler: impl ChatHandler + 'static) -> Self {
        Callback::Chat(Arc::new(handler))
    }

    /// A console callback fits only Console scope; a chat callback fits
    /// the chat scopes.
    pub fn fits(&self, scope: CommandScope) -> bool {
        match self {
            Callback::Console(_) => scope == CommandScope::Console,
            Callback::Chat(_) => scope.is_chat(),
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Console(_) => write!(f, "Callback::Console(..)"),
            Callback::Chat(_) => write!(f, "Callback::Chat(..)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A registered command. Immutable once registered; unregister and
/// re-register to change behavior.
#[derive(Debug, Clone)]
pub struct Command {
    /// Lowercase, no whitespace or quote characters.
    pub name: String,
    pub scope: CommandScope,
    pub callback: Callback,
}

// ---------------------------------------------------------------------------
// Resolve result
// ---------------------------------------------------------------------------

/// What became of an executed callback.
#[derive(Debug)]
pub enum CommandOutcome {
    Completed(CommandReply),
    Failed(anyhow::Error),
    /// The callback did not resolve within the dispatcher's execution
    /// timeout.
    TimedOut,
}

/// Structured outcome of processing one inbound input. The dispatcher
/// never returns an error; unknown commands, wrong scopes, disabled
/// commands, and callback failures all land in these fields.
#[derive(Debug)]
pub struct ResolveResult {
    /// Whether the input matched the prefix/format of a command attempt.
    pub is_command: bool,
    /// Parsed command name (lowercase), when `is_command`.
    pub name: Option<String>,
    /// Tokenized arguments.
    pub args: Vec<String>,
    /// Scope the input was invoked from.
    pub invoked_scope: CommandScope,
    /// True only if a callback actually ran (including running into the
    /// timeout).
    pub was_executed: bool,
    /// Scope of the command found during lookup, if any.
    pub resolved_scope: Option<CommandScope>,
    /// Callback of the command found during lookup, if any.
    pub resolved_callback: Option<Callback>,
    /// Captured callback outcome, when executed.
    pub outcome: Option<CommandOutcome>,
}

impl ResolveResult {
    /// Input did not parse as a command attempt at all.
    pub(crate) fn not_command(invoked: CommandScope) -> Self {
        Self {
            is_command: false,
            name: None,
            args: Vec::new(),
            invoked_scope: invoked,
            was_executed: false,
            resolved_scope: None,
            resolved_callback: None,
            outcome: None,
        }
    }

    /// Command attempt that parsed out `name` and `args`; lookup fields
    /// start empty.
    pub(crate) fn attempt(invoked: CommandScope, name: String, args: Vec<String>) -> Self {
        Self {
            name: Some(name),
            args,
            is_command: true,
            ..Self::not_command(invoked)
        }
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }
}
