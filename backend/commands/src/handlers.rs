/// Built-in command handlers.
///
/// Each handler is a concrete struct implementing `ConsoleHandler` or
/// `ChatHandler`, holding the registry it operates on.
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use botkit_core::CommandScope;

use crate::registry::CommandRegistry;
use crate::types::{Callback, ChatContext, ChatHandler, CommandReply, ConsoleHandler};

// ---------------------------------------------------------------------------
// commands — list registered commands (console)
// ---------------------------------------------------------------------------

pub struct ListCommandsHandler {
    pub registry: Arc<CommandRegistry>,
}

#[async_trait]
impl ConsoleHandler for ListCommandsHandler {
    async fn handle(&self, _args: &[String]) -> Result<CommandReply> {
        let mut lines = vec!["Registered commands:".to_string()];
        for (name, scope) in self.registry.commands().await {
            lines.push(format!("  {name} [{scope}]"));
        }
        Ok(CommandReply::ok(lines.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// prefix — show or change the prefix for the invoking identity (chat)
// ---------------------------------------------------------------------------

pub struct PrefixHandler {
    pub registry: Arc<CommandRegistry>,
}

#[async_trait]
impl ChatHandler for PrefixHandler {
    async fn handle(&self, ctx: &ChatContext, args: &[String]) -> Result<CommandReply> {
        let Some(prefix) = args.first() else {
            let current = self.registry.prefix(&ctx.identity).await;
            return Ok(CommandReply::ephemeral(format!("Current prefix: `{current}`")));
        };
        if self.registry.set_prefix(&ctx.identity, prefix).await {
            Ok(CommandReply::ok(format!("✅ Prefix changed to `{prefix}`")))
        } else {
            Ok(CommandReply::ephemeral(
                "❌ Prefix must be non-empty and contain no whitespace",
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// disable / enable — toggle a command for the invoking identity (chat)
// ---------------------------------------------------------------------------

pub struct DisableHandler {
    pub registry: Arc<CommandRegistry>,
}

#[async_trait]
impl ChatHandler for DisableHandler {
    async fn handle(&self, ctx: &ChatContext, args: &[String]) -> Result<CommandReply> {
        let Some(name) = args.first() else {
            return Ok(CommandReply::ephemeral("Usage: disable <command>"));
        };
        if self.registry.disable(&ctx.identity, name).await {
            Ok(CommandReply::ok(format!("🚫 Command `{name}` disabled here")))
        } else {
            Ok(CommandReply::ephemeral(format!("`{name}` is already disabled")))
        }
    }
}

pub struct EnableHandler {
    pub registry: Arc<CommandRegistry>,
}

#[async_trait]
impl ChatHandler for EnableHandler {
    async fn handle(&self, ctx: &ChatContext, args: &[String]) -> Result<CommandReply> {
        let Some(name) = args.first() else {
            return Ok(CommandReply::ephemeral("Usage: enable <command>"));
        };
        if self.registry.enable(&ctx.identity, name).await {
            Ok(CommandReply::ok(format!("✅ Command `{name}` enabled here")))
        } else {
            Ok(CommandReply::ephemeral(format!("`{name}` is not disabled")))
        }
    }
}

// ---------------------------------------------------------------------------
// disabled — list commands disabled for the invoking identity (chat)
// ---------------------------------------------------------------------------

pub struct DisabledListHandler {
    pub registry: Arc<CommandRegistry>,
}

#[async_trait]
impl ChatHandler for DisabledListHandler {
    async fn handle(&self, ctx: &ChatContext, _args: &[String]) -> Result<CommandReply> {
        let disabled = self.registry.disabled_commands(&ctx.identity).await;
        if disabled.is_empty() {
            Ok(CommandReply::ephemeral("No commands are disabled here"))
        } else {
            Ok(CommandReply::ephemeral(format!(
                "Disabled here: {}",
                disabled.join(", ")
            )))
        }
    }
}

/// Register the built-in commands on `registry`.
pub async fn install_builtins(registry: &Arc<CommandRegistry>) {
    registry
        .register(
            "commands",
            CommandScope::Console,
            Callback::Console(Arc::new(ListCommandsHandler {
                registry: Arc::clone(registry),
            })),
        )
        .await;
    registry
        .register(
            "prefix",
            CommandScope::Shared,
            Callback::Chat(Arc::new(PrefixHandler {
                registry: Arc::clone(registry),
            })),
        )
        .await;
    registry
        .register(
            "disable",
            CommandScope::Shared,
            Callback::Chat(Arc::new(DisableHandler {
                registry: Arc::clone(registry),
            })),
        )
        .await;
    registry
        .register(
            "enable",
            CommandScope::Shared,
            Callback::Chat(Arc::new(EnableHandler {
                registry: Arc::clone(registry),
            })),
        )
        .await;
    registry
        .register(
            "disabled",
            CommandScope::Shared,
            Callback::Chat(Arc::new(DisabledListHandler {
                registry: Arc::clone(registry),
            })),
        )
        .await;
}
