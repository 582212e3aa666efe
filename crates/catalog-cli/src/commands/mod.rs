pub mod export;
pub mod export_ui;
pub mod serve;
pub mod wishlist;

use anyhow::{Context, Result};
use catalog_config::Config;
use catalog_core::{JsonFileWishlistStore, SheetWishlistStore, WishlistStore};
use catalog_sources::{GoogleSheetsClient, RetryPolicy, ServiceAccountKey};
use std::sync::Arc;
use tracing::{debug, info};

/// Sheets client when a credentials file is present; `None` means the
/// spreadsheet features are unavailable on this machine.
pub fn sheets_client(config: &Config) -> Result<Option<Arc<GoogleSheetsClient>>> {
    let path = &config.google.credentials_file;
    if !path.exists() {
        debug!("No Google credentials at {}", path.display());
        return Ok(None);
    }
    let key = ServiceAccountKey::from_file(path)
        .with_context(|| format!("Failed to load Google credentials from {}", path.display()))?;
    let client = GoogleSheetsClient::new(key, RetryPolicy::from(&config.retry))
        .context("Failed to create Google Sheets client")?;
    info!("Using Google service account {}", client.service_account());
    Ok(Some(Arc::new(client)))
}

/// The wishlist lives in the configured spreadsheet when a Sheets client is
/// available, otherwise in the local JSON file.
pub fn wishlist_store(config: &Config, sheets: Option<Arc<GoogleSheetsClient>>) -> Result<Box<dyn WishlistStore>> {
    if let Some(client) = sheets {
        return Ok(Box::new(SheetWishlistStore::new(
            client,
            config.wishlist.sheet_name.clone(),
        )));
    }
    let path = config
        .wishlist
        .local_file
        .clone()
        .context("No wishlist file configured")?;
    Ok(Box::new(JsonFileWishlistStore::new(path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wishlist_store_falls_back_to_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.google.credentials_file = dir.path().join("missing.json");
        config.wishlist.local_file = Some(dir.path().join("wishlist.json"));

        let sheets = sheets_client(&config).unwrap();
        assert!(sheets.is_none());
        let store = wishlist_store(&config, sheets).unwrap();
        assert_eq!(store.describe(), dir.path().join("wishlist.json").display().to_string());
    }

    #[test]
    fn test_bad_credentials_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let creds = dir.path().join("creds.json");
        std::fs::write(&creds, "{}").unwrap();
        let mut config = Config::default();
        config.google.credentials_file = creds;

        assert!(sheets_client(&config).is_err());
    }
}
