//! Per-identity settings: command prefix and disabled commands.
//!
//! Settings are created lazily on first lookup for an unseen identity and
//! persisted immediately on every mutation. A corrupt backing file is
//! deleted and the load retried once before the failure is surfaced
//! (reset over crash, with a bounded retry).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use botkit_core::BotkitError;

use crate::storage::SettingsStorage;

/// Process-wide default prefix for identities that never set one.
pub const DEFAULT_PREFIX: &str = "!";

/// Settings for one server or user identity, as persisted on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySettings {
    pub id: String,
    pub prefix: String,
    pub disabled_commands: Vec<String>,
}

impl IdentitySettings {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prefix: DEFAULT_PREFIX.to_string(),
            disabled_commands: Vec::new(),
        }
    }

    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled_commands.iter().any(|c| c == name)
    }
}

/// In-memory settings collection over a storage backend. Keyed by
/// identity id; the on-disk shape stays a flat JSON array.
pub struct SettingsStore {
    storage: Box<dyn SettingsStorage>,
    entries: HashMap<String, IdentitySettings>,
}

impl SettingsStore {
    /// Load the collection. An absent backing file is seeded empty; a
    /// corrupt one is deleted and the load retried once.
    pub async fn load(storage: Box<dyn SettingsStorage>) -> Result<Self, BotkitError> {
        let mut reset_done = false;
        let list = loop {
            match storage.load().await {
                Ok(Some(list)) => break list,
                Ok(None) => {
                    // First run: seed an empty file so later saves are
                    // plain overwrites.
                    storage
                        .save(&[])
                        .await
                        .map_err(|e| BotkitError::Storage(e.to_string()))?;
                    break Vec::new();
                }
                Err(err) if !reset_done => {
                    error!(error = %err, "[Commands] Settings unreadable; resetting store");
                    storage
                        .reset()
                        .await
                        .map_err(|e| BotkitError::Storage(e.to_string()))?;
                    reset_done = true;
                }
                Err(err) => return Err(BotkitError::CorruptStore(err.to_string())),
            }
        };

        let entries = list.into_iter().map(|s| (s.id.clone(), s)).collect();
        Ok(Self { storage, entries })
    }

    /// Effective prefix for `id`, creating (and persisting) a defaulted
    /// entry on first sight.
    pub async fn prefix(&mut self, id: &str) -> String {
        self.ensure(id).await;
        self.entries
            .get(id)
            .map(|e| e.prefix.clone())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string())
    }

    /// Set a new prefix. Rejects empty prefixes and prefixes containing
    /// whitespace.
    pub async fn set_prefix(&mut self, id: &str, prefix: &str) -> bool {
        if prefix.is_empty() || prefix.chars().any(char::is_whitespace) {
            return false;
        }
        self.ensure(id).await;
        if let Some(entry) = self.entries.get_mut(id) {
            entry.prefix = prefix.to_string();
        }
        self.persist().await;
        true
    }

    pub async fn is_disabled(&mut self, id: &str, name: &str) -> bool {
        self.ensure(id).await;
        self.entries.get(id).is_some_and(|e| e.is_disabled(name))
    }

    pub async fn disabled_commands(&mut self, id: &str) -> Vec<String> {
        self.ensure(id).await;
        self.entries
            .get(id)
            .map(|e| e.disabled_commands.clone())
            .unwrap_or_default()
    }

    /// Returns false if already disabled.
    pub async fn disable(&mut self, id: &str, name: &str) -> bool {
        self.ensure(id).await;
        let changed = match self.entries.get_mut(id) {
            Some(entry) if !entry.is_disabled(name) => {
                entry.disabled_commands.push(name.to_string());
                true
            }
            _ => false,
        };
        if changed {
            self.persist().await;
        }
        changed
    }

    /// Returns false if not currently disabled.
    pub async fn enable(&mut self, id: &str, name: &str) -> bool {
        self.ensure(id).await;
        let changed = match self.entries.get_mut(id) {
            Some(entry) if entry.is_disabled(name) => {
                entry.disabled_commands.retain(|c| c != name);
                true
            }
            _ => false,
        };
        if changed {
            self.persist().await;
        }
        changed
    }

    async fn ensure(&mut self, id: &str) {
        if !self.entries.contains_key(id) {
            self.entries
                .insert(id.to_string(), IdentitySettings::new(id));
            self.persist().await;
        }
    }

    /// Overwrite the backing store with the full collection. A failed
    /// write is logged, not retried; the in-memory mutation stands.
    async fn persist(&self) {
        let mut list: Vec<IdentitySettings> = self.entries.values().cloned().collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        if let Err(err) = self.storage.save(&list).await {
            warn!(error = %err, "[Commands] Failed to persist identity settings");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    async fn store() -> SettingsStore {
        SettingsStore::load(Box::<MemoryStorage>::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_unseen_identity_gets_default_prefix() {
        let mut store = store().await;
        assert_eq!(store.prefix("guild-1").await, DEFAULT_PREFIX);
    }

    #[tokio::test]
    async fn test_set_prefix_rejects_empty_and_whitespace() {
        let mut store = store().await;
        assert!(!store.set_prefix("guild-1", "").await);
        assert!(!store.set_prefix("guild-1", "! ").await);
        assert!(store.set_prefix("guild-1", "$").await);
        assert_eq!(store.prefix("guild-1").await, "$");
    }

    #[tokio::test]
    async fn test_prefix_isolation_between_identities() {
        let mut store = store().await;
        assert!(store.set_prefix("a", "$").await);
        assert_eq!(store.prefix("b").await, DEFAULT_PREFIX);
    }

    #[tokio::test]
    async fn test_disable_enable_round_trip() {
        let mut store = store().await;
        assert!(store.disable("g", "ping").await);
        assert!(!store.disable("g", "ping").await);
        assert!(store.is_disabled("g", "ping").await);
        assert_eq!(store.disabled_commands("g").await, vec!["ping"]);
        assert!(store.enable("g", "ping").await);
        assert!(!store.enable("g", "ping").await);
        assert!(!store.is_disabled("g", "ping").await);
    }

    #[tokio::test]
    async fn test_settings_serialize_with_camel_case_key() {
        let entry = IdentitySettings::new("g");
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("disabledCommands").is_some());
    }
}
