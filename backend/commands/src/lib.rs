pub mod dispatch;
pub mod handlers;
pub mod registry;
pub mod settings;
pub mod storage;
pub mod tokenize;
pub mod types;

#[cfg(test)]
mod tests;

pub use dispatch::{CommandDispatcher, DEFAULT_EXECUTION_TIMEOUT};
pub use handlers::{
    DisableHandler, DisabledListHandler, EnableHandler, ListCommandsHandler, PrefixHandler,
    install_builtins,
};
pub use registry::CommandRegistry;
pub use settings::{DEFAULT_PREFIX, IdentitySettings, SettingsStore};
pub use storage::{JsonFileStorage, MemoryStorage, SettingsStorage};
pub use tokenize::tokenize;
pub use types::{
    Callback, ChatContext, ChatHandler, Command, CommandOutcome, CommandReply, ConsoleHandler,
    ResolveResult,
};

use std::sync::Arc;

/// Build a dispatcher over `registry`, pre-wired with the built-in
/// commands (help listing, prefix, enable/disable).
pub async fn build_default_dispatcher(registry: Arc<CommandRegistry>) -> CommandDispatcher {
    install_builtins(&registry).await;
    CommandDispatcher::new(registry)
}
