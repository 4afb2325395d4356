//! Command registry — owns the registered command set and the
//! per-identity settings, enforcing naming and scope-exclusivity rules.

use tokio::sync::Mutex;
use tracing::{debug, info};

use botkit_core::{BotkitError, CommandScope};

use crate::settings::SettingsStore;
use crate::storage::SettingsStorage;
use crate::types::{Callback, Command};

struct RegistryState {
    /// Insertion order is the lookup order for `find_by_name`.
    commands: Vec<Command>,
    settings: SettingsStore,
}

/// Registry of commands plus per-identity prefix and disabled-command
/// state. One mutex guards both; reads clone out of the lock so nothing
/// is held across callback execution.
pub struct CommandRegistry {
    state: Mutex<RegistryState>,
}

impl CommandRegistry {
    /// Open a registry over the given settings storage. Loading applies
    /// the reset-over-crash policy: a corrupt backing file is deleted and
    /// the load retried once before giving up.
    pub async fn open(storage: Box<dyn SettingsStorage>) -> Result<Self, BotkitError> {
        let settings = SettingsStore::load(storage).await?;
        Ok(Self {
            state: Mutex::new(RegistryState {
                commands: Vec::new(),
                settings,
            }),
        })
    }

    // -----------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------

    /// Register a command. Fails on a malformed name, on a duplicate
    /// `(name, scope)` pair, on a callback whose shape does not fit the
    /// scope, and on a chat scope already covered by a same-named Shared
    /// command. Registering a Shared command evicts same-named DM/Server
    /// commands first.
    pub async fn register(&self, name: &str, scope: CommandScope, callback: Callback) -> bool {
        if !valid_name(name) || !callback.fits(scope) {
            return false;
        }
        let name = name.to_lowercase();
        let mut state = self.state.lock().await;

        if state
            .commands
            .iter()
            .any(|c| c.name == name && c.scope == scope)
        {
            return false;
        }

        match scope {
            CommandScope::Shared => {
                // Shared supersedes scope-specific chat commands of the
                // same name.
                state.commands.retain(|c| {
                    !(c.name == name
                        && matches!(
                            c.scope,
                            CommandScope::DirectMessage | CommandScope::Server
                        ))
                });
            }
            CommandScope::DirectMessage | CommandScope::Server => {
                // A Shared command already covers this scope.
                if state
                    .commands
                    .iter()
                    .any(|c| c.name == name && c.scope == CommandScope::Shared)
                {
                    return false;
                }
            }
            CommandScope::Console => {}
        }

        info!(name = %name, scope = %scope, "[Commands] Registered command");
        state.commands.push(Command {
            name,
            scope,
            callback,
        });
        true
    }

    /// Unregister by name, optionally narrowed to one scope. Returns
    /// false if nothing matched.
    pub async fn unregister(&self, name: &str, scope: Option<CommandScope>) -> bool {
        let name = name.to_lowercase();
        let mut state = self.state.lock().await;
        let before = state.commands.len();
        state
            .commands
            .retain(|c| !(c.name == name && scope.is_none_or(|s| c.scope == s)));
        let removed = state.commands.len() != before;
        if removed {
            info!(name = %name, "[Commands] Unregistered command");
        }
        removed
    }

    /// All commands sharing `name`, in registration order.
    pub async fn find_by_name(&self, name: &str) -> Vec<Command> {
        let name = name.to_lowercase();
        let state = self.state.lock().await;
        state
            .commands
            .iter()
            .filter(|c| c.name == name)
            .cloned()
            .collect()
    }

    /// Exact-scope lookup. For chat invocations a Shared command also
    /// satisfies DirectMessage and Server.
    pub async fn find_exact(&self, name: &str, invoked: CommandScope) -> Option<Command> {
        let name = name.to_lowercase();
        let state = self.state.lock().await;
        state
            .commands
            .iter()
            .find(|c| c.name == name && c.scope.accepts(invoked))
            .cloned()
    }

    /// `(name, scope)` listing of every registered command.
    pub async fn commands(&self) -> Vec<(String, CommandScope)> {
        let state = self.state.lock().await;
        state
            .commands
            .iter()
            .map(|c| (c.name.clone(), c.scope))
            .collect()
    }

    /// Callback of the exact `(name, scope)` command.
    pub async fn callback_for(&self, name: &str, scope: CommandScope) -> Option<Callback> {
        self.find_exact(name, scope).await.map(|c| c.callback)
    }

    /// All callbacks registered under `name`, tagged with their scope.
    pub async fn callbacks(&self, name: &str) -> Vec<(CommandScope, Callback)> {
        self.find_by_name(name)
            .await
            .into_iter()
            .map(|c| (c.scope, c.callback))
            .collect()
    }

    // -----------------------------------------------------------------
    // Identity settings
    // -----------------------------------------------------------------

    /// Effective prefix for `id`; creates and persists a defaulted entry
    /// on first sight.
    pub async fn prefix(&self, id: &str) -> String {
        self.state.lock().await.settings.prefix(id).await
    }

    /// Returns false if the prefix is empty or contains whitespace.
    pub async fn set_prefix(&self, id: &str, prefix: &str) -> bool {
        let accepted = self.state.lock().await.settings.set_prefix(id, prefix).await;
        if accepted {
            debug!(id = %id, prefix = %prefix, "[Commands] Prefix updated");
        }
        accepted
    }

    /// Disabled state is per identity; console invocations never consult
    /// it.
    pub async fn is_disabled(&self, id: &str, name: &str) -> bool {
        let name = name.to_lowercase();
        self.state.lock().await.settings.is_disabled(id, &name).await
    }

    /// Returns false if already disabled.
    pub async fn disable(&self, id: &str, name: &str) -> bool {
        let name = name.to_lowercase();
        self.state.lock().await.settings.disable(id, &name).await
    }

    /// Returns false if not currently disabled.
    pub async fn enable(&self, id: &str, name: &str) -> bool {
        let name = name.to_lowercase();
        self.state.lock().await.settings.enable(id, &name).await
    }

    pub async fn disabled_commands(&self, id: &str) -> Vec<String> {
        self.state.lock().await.settings.disabled_commands(id).await
    }
}

/// Command names carry no whitespace and no quote characters, so they
/// survive tokenization untouched.
fn valid_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(|c| c.is_whitespace() || c == '"')
}
