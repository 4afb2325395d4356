//! Command dispatch — resolve one inbound input against the registry and
//! optionally run the matched callback.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info};

use botkit_core::Incoming;

use crate::registry::CommandRegistry;
use crate::tokenize::tokenize;
use crate::types::{Callback, ChatContext, CommandOutcome, ResolveResult};

/// Default bound on how long a callback may run.
pub const DEFAULT_EXECUTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Dispatcher over a shared registry. Safe to call from the hot
/// message-handling path: `handle` never fails, every outcome is encoded
/// in the returned [`ResolveResult`].
pub struct CommandDispatcher {
    registry: Arc<CommandRegistry>,
    execution_timeout: Duration,
}

impl CommandDispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self {
            registry,
            execution_timeout: DEFAULT_EXECUTION_TIMEOUT,
        }
    }

    /// Replace the bound on callback execution; a callback exceeding it
    /// is reported as [`CommandOutcome::TimedOut`] instead of hanging the
    /// dispatch.
    pub fn with_execution_timeout(mut self, execution_timeout: Duration) -> Self {
        self.execution_timeout = execution_timeout;
        self
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Process one inbound input. With `execute = false` the input is
    /// resolved but the callback is not run (preview mode).
    pub async fn handle(&self, incoming: &Incoming, execute: bool) -> ResolveResult {
        let invoked = incoming.scope();

        let Some(name) = self.parse_name(incoming).await else {
            return ResolveResult::not_command(invoked);
        };

        let args = tokenize(incoming.text());
        let mut result = ResolveResult::attempt(invoked, name.clone(), args);

        let matches = self.registry.find_by_name(&name).await;
        let Some(first) = matches.first() else {
            debug!(name = %name, scope = %invoked, "[Commands] Unknown command");
            return result;
        };

        let Some(exact) = self.registry.find_exact(&name, invoked).await else {
            // The name exists, but only under other scopes (e.g. a
            // console-only command invoked from chat). Report the first
            // same-named command so the caller can explain the mismatch.
            result.resolved_scope = Some(first.scope);
            result.resolved_callback = Some(first.callback.clone());
            return result;
        };

        result.resolved_scope = Some(exact.scope);
        result.resolved_callback = Some(exact.callback.clone());

        if let Incoming::Chat(message) = incoming {
            if self.registry.is_disabled(message.identity(), &name).await {
                debug!(name = %name, identity = %message.identity(), "[Commands] Command disabled");
                return result;
            }
        }

        if !execute {
            return result;
        }

        info!(name = %name, scope = %invoked, "[Commands] Dispatching command");
        let outcome = self.run(&exact.callback, incoming, &result.args).await;
        result.outcome = Some(outcome);
        result.was_executed = true;
        result
    }

    /// Locate the command name, if any. Console input needs no prefix;
    /// chat input must start with the identity's resolved prefix, which
    /// lazily creates the identity's settings on first sight.
    async fn parse_name(&self, incoming: &Incoming) -> Option<String> {
        let first_token = |text: &str| text.split_whitespace().next().map(str::to_string);
        match incoming {
            Incoming::Console(line) => {
                let first = first_token(line)?;
                normalize(&first)
            }
            Incoming::Chat(message) => {
                let prefix = self.registry.prefix(message.identity()).await;
                let first = first_token(&message.text)?;
                let stripped = first.strip_prefix(&prefix)?;
                normalize(stripped)
            }
        }
    }

    async fn run(
        &self,
        callback: &Callback,
        incoming: &Incoming,
        args: &[String],
    ) -> CommandOutcome {
        let fut = async {
            match (callback, incoming) {
                (Callback::Console(handler), _) => handler.handle(args).await,
                (Callback::Chat(handler), Incoming::Chat(message)) => {
                    let ctx = ChatContext::from_message(message);
                    handler.handle(&ctx, args).await
                }
                // Scope matching never hands a chat callback a console
                // invocation; reported as data rather than panicking.
                (Callback::Chat(_), Incoming::Console(_)) => {
                    Err(anyhow::anyhow!("chat callback invoked from console scope"))
                }
            }
        };
        match timeout(self.execution_timeout, fut).await {
            Ok(Ok(reply)) => CommandOutcome::Completed(reply),
            Ok(Err(err)) => CommandOutcome::Failed(err),
            Err(_) => CommandOutcome::TimedOut,
        }
    }
}

/// Case-fold and trim a candidate command name; empty means the input is
/// not a command attempt.
fn normalize(raw: &str) -> Option<String> {
    let name = raw.trim().to_lowercase();
    (!name.is_empty()).then_some(name)
}
