//! The wishlist: an ordered list of titles to acquire, persisted through a
//! swappable [`WishlistStore`].

pub mod file;
pub mod sheet;

pub use file::{JsonFileWishlistStore, MemoryWishlistStore};
pub use sheet::SheetWishlistStore;

use async_trait::async_trait;
use catalog_models::{new_entry_id, NewWishlistEntry, WishlistEntry, WishlistPatch};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum WishlistError {
    #[error("index {index} is out of range for a wishlist of {len} entries")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("no wishlist entry with id {0}")]
    NotFound(String),
    #[error("wishlist entries need a title")]
    MissingTitle,
    #[error("wishlist store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

/// Persistence for the whole list. Stores always read and write every
/// entry; there is no partial update at this level.
#[async_trait]
pub trait WishlistStore: Send + Sync {
    async fn load(&self) -> anyhow::Result<Vec<WishlistEntry>>;
    async fn save(&self, entries: &[WishlistEntry]) -> anyhow::Result<()>;

    /// Where entries live, for log and console messages
    fn describe(&self) -> String;
}

#[async_trait]
impl WishlistStore for Box<dyn WishlistStore> {
    async fn load(&self) -> anyhow::Result<Vec<WishlistEntry>> {
        (**self).load().await
    }

    async fn save(&self, entries: &[WishlistEntry]) -> anyhow::Result<()> {
        (**self).save(entries).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// List operations over a store. Every mutation reloads the list, changes
/// it and saves it back, so concurrent writers in other processes can still
/// lose updates.
pub struct Wishlist<S> {
    store: S,
}

impl<S: WishlistStore> Wishlist<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn load(&self) -> Result<Vec<WishlistEntry>, WishlistError> {
        let mut entries = self.store.load().await?;
        let mut assigned = 0;
        for entry in entries.iter_mut().filter(|e| e.id.is_empty()) {
            entry.id = new_entry_id();
            assigned += 1;
        }
        // persist so the ids stay stable across loads
        if assigned > 0 {
            info!("Assigned ids to {} legacy wishlist entries", assigned);
            self.save(&entries).await?;
        }
        Ok(entries)
    }

    async fn save(&self, entries: &[WishlistEntry]) -> Result<(), WishlistError> {
        self.store.save(entries).await?;
        debug!("Saved {} wishlist entries to {}", entries.len(), self.store.describe());
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<WishlistEntry>, WishlistError> {
        self.load().await
    }

    pub async fn add(&self, entry: NewWishlistEntry) -> Result<WishlistEntry, WishlistError> {
        if entry.title.trim().is_empty() {
            return Err(WishlistError::MissingTitle);
        }
        let mut entries = self.load().await?;
        let entry = WishlistEntry::new(entry);
        entries.push(entry.clone());
        self.save(&entries).await?;
        info!("Added '{}' to the wishlist", entry.title);
        Ok(entry)
    }

    /// Overwrite the supplied fields of the entry at `index`
    pub async fn update_at(&self, index: usize, patch: WishlistPatch) -> Result<WishlistEntry, WishlistError> {
        check_patch(&patch)?;
        let mut entries = self.load().await?;
        let len = entries.len();
        let entry = entries
            .get_mut(index)
            .ok_or(WishlistError::IndexOutOfRange { index, len })?;
        patch.apply(entry);
        let updated = entry.clone();
        self.save(&entries).await?;
        info!("Updated wishlist entry {} ('{}')", index, updated.title);
        Ok(updated)
    }

    /// Remove the entry at `index`; later entries shift down by one
    pub async fn delete_at(&self, index: usize) -> Result<WishlistEntry, WishlistError> {
        let mut entries = self.load().await?;
        if index >= entries.len() {
            return Err(WishlistError::IndexOutOfRange {
                index,
                len: entries.len(),
            });
        }
        let removed = entries.remove(index);
        self.save(&entries).await?;
        info!("Removed '{}' from the wishlist", removed.title);
        Ok(removed)
    }

    pub async fn update_by_id(&self, id: &str, patch: WishlistPatch) -> Result<WishlistEntry, WishlistError> {
        let index = self.position_of(id).await?;
        self.update_at(index, patch).await
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<WishlistEntry, WishlistError> {
        let index = self.position_of(id).await?;
        self.delete_at(index).await
    }

    async fn position_of(&self, id: &str) -> Result<usize, WishlistError> {
        self.load()
            .await?
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| WishlistError::NotFound(id.to_string()))
    }
}

fn check_patch(patch: &WishlistPatch) -> Result<(), WishlistError> {
    match &patch.title {
        Some(title) if title.trim().is_empty() => Err(WishlistError::MissingTitle),
        _ => Ok(()),
    }
}
