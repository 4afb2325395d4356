//! Storage seam for the identity-settings collection.
//!
//! The registry is the single writer; every save overwrites the full
//! collection. Kept behind a trait so the JSON file backend can be
//! swapped for batched or in-memory persistence without touching the
//! registry logic.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;

use crate::settings::IdentitySettings;

#[async_trait]
pub trait SettingsStorage: Send + Sync {
    /// `Ok(None)` means the backing data does not exist yet. A read or
    /// parse failure is an `Err`.
    async fn load(&self) -> Result<Option<Vec<IdentitySettings>>>;

    /// Overwrite the backing data with the full collection.
    async fn save(&self, entries: &[IdentitySettings]) -> Result<()>;

    /// Destroy the backing data after a failed load.
    async fn reset(&self) -> Result<()>;
}

// ---------------------------------------------------------------------------
// JSON file backend
// ---------------------------------------------------------------------------

/// File storage holding one JSON array of
/// `{ "id": …, "prefix": …, "disabledCommands": […] }` objects.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsStorage for JsonFileStorage {
    async fn load(&self) -> Result<Option<Vec<IdentitySettings>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read settings file: {}", self.path.display()))?;
        let entries = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse settings JSON at: {}", self.path.display()))?;
        Ok(Some(entries))
    }

    async fn save(&self, entries: &[IdentitySettings]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create settings directory: {}", parent.display())
                })?;
            }
        }

        let json = serde_json::to_string_pretty(entries)
            .context("Failed to serialize identity settings")?;

        // Write to temp file, then rename for atomicity.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json.as_bytes())
            .await
            .with_context(|| format!("Failed to write temp settings file: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to rename temp settings to: {}", self.path.display()))?;
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .await
                .with_context(|| format!("Failed to delete settings file: {}", self.path.display()))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// In-memory storage for tests and ephemeral processes.
#[derive(Default)]
pub struct MemoryStorage {
    entries: tokio::sync::Mutex<Option<Vec<IdentitySettings>>>,
}

#[async_trait]
impl SettingsStorage for MemoryStorage {
    async fn load(&self) -> Result<Option<Vec<IdentitySettings>>> {
        Ok(self.entries.lock().await.clone())
    }

    async fn save(&self, entries: &[IdentitySettings]) -> Result<()> {
        *self.entries.lock().await = Some(entries.to_vec());
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        *self.entries.lock().await = None;
        Ok(())
    }
}
