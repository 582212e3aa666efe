use super::WishlistStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use catalog_models::WishlistEntry;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// Wishlist kept as a pretty-printed JSON array on local disk.
pub struct JsonFileWishlistStore {
    path: PathBuf,
}

impl JsonFileWishlistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl WishlistStore for JsonFileWishlistStore {
    async fn load(&self) -> Result<Vec<WishlistEntry>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No wishlist file at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse wishlist file {}", self.path.display()))
    }

    async fn save(&self, entries: &[WishlistEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(entries)?;

        // Atomic write: write to temp file, then rename
        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, json)
            .await
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Default)]
pub struct MemoryWishlistStore {
    entries: Mutex<Vec<WishlistEntry>>,
}

impl MemoryWishlistStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<WishlistEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }
}

#[async_trait]
impl WishlistStore for MemoryWishlistStore {
    async fn load(&self) -> Result<Vec<WishlistEntry>> {
        Ok(self.entries.lock().await.clone())
    }

    async fn save(&self, entries: &[WishlistEntry]) -> Result<()> {
        *self.entries.lock().await = entries.to_vec();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
