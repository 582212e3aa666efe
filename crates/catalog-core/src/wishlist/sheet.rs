use super::WishlistStore;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use catalog_models::WishlistEntry;
use catalog_sources::{SheetRow, SpreadsheetService, TabInfo};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

pub const WISHLIST_HEADER: [&str; 4] = ["Title", "Notes", "Desired Format", "Id"];

/// Column positions resolved from a header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    title: usize,
    notes: Option<usize>,
    format: Option<usize>,
    id: Option<usize>,
}

impl Columns {
    fn from_header(header: &[String]) -> Self {
        let find = |names: &[&str]| {
            header
                .iter()
                .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
        };
        match find(&["title"]) {
            Some(title) => Self {
                title,
                notes: find(&["notes"]),
                format: find(&["desired format", "format"]),
                id: find(&["id"]),
            },
            // no recognizable header: assume the column order we write
            None => Self {
                title: 0,
                notes: Some(1),
                format: Some(2),
                id: Some(3),
            },
        }
    }
}

fn cell(row: &[String], index: Option<usize>) -> String {
    index
        .and_then(|i| row.get(i))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Turn a tab's rows (header first) into entries, skipping blank rows.
pub(crate) fn parse_rows(rows: &[Vec<String>]) -> Vec<WishlistEntry> {
    let Some((header, data)) = rows.split_first() else {
        return Vec::new();
    };
    let columns = Columns::from_header(header);
    data.iter()
        .map(|row| WishlistEntry {
            id: cell(row, columns.id),
            title: cell(row, Some(columns.title)),
            notes: cell(row, columns.notes),
            format: cell(row, columns.format),
        })
        .filter(|e| !(e.title.is_empty() && e.notes.is_empty() && e.format.is_empty()))
        .collect()
}

pub(crate) fn to_rows(entries: &[WishlistEntry]) -> Vec<SheetRow> {
    let mut rows: Vec<SheetRow> = vec![WISHLIST_HEADER.iter().map(|h| Value::from(*h)).collect()];
    rows.extend(entries.iter().map(|e| {
        vec![
            Value::from(e.title.as_str()),
            Value::from(e.notes.as_str()),
            Value::from(e.format.as_str()),
            Value::from(e.id.as_str()),
        ]
    }));
    rows
}

/// Wishlist kept in the first tab of a remote spreadsheet, addressed by
/// spreadsheet title. The spreadsheet id is resolved once and cached.
pub struct SheetWishlistStore {
    service: Arc<dyn SpreadsheetService>,
    spreadsheet_title: String,
    spreadsheet_id: Mutex<Option<String>>,
}

impl SheetWishlistStore {
    pub fn new(service: Arc<dyn SpreadsheetService>, spreadsheet_title: impl Into<String>) -> Self {
        Self {
            service,
            spreadsheet_title: spreadsheet_title.into(),
            spreadsheet_id: Mutex::new(None),
        }
    }

    async fn spreadsheet_id(&self) -> Result<String> {
        let mut cached = self.spreadsheet_id.lock().await;
        if let Some(id) = cached.as_ref() {
            return Ok(id.clone());
        }
        let id = self
            .service
            .open_by_title(&self.spreadsheet_title)
            .await
            .with_context(|| format!("Failed to open spreadsheet '{}'", self.spreadsheet_title))?;
        *cached = Some(id.clone());
        Ok(id)
    }

    async fn first_tab(&self, spreadsheet_id: &str) -> Result<TabInfo> {
        self.service
            .tabs(spreadsheet_id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Spreadsheet '{}' has no tabs", self.spreadsheet_title))
    }
}

#[async_trait]
impl WishlistStore for SheetWishlistStore {
    async fn load(&self) -> Result<Vec<WishlistEntry>> {
        let id = self.spreadsheet_id().await?;
        let tab = self.first_tab(&id).await?;
        let rows = self
            .service
            .read_rows(&id, &tab.title)
            .await
            .with_context(|| format!("Failed to read wishlist tab '{}'", tab.title))?;
        let entries = parse_rows(&rows);
        debug!("Loaded {} wishlist entries from '{}'", entries.len(), self.spreadsheet_title);
        Ok(entries)
    }

    async fn save(&self, entries: &[WishlistEntry]) -> Result<()> {
        let id = self.spreadsheet_id().await?;
        let tab = self.first_tab(&id).await?;
        let existing = self
            .service
            .read_rows(&id, &tab.title)
            .await
            .with_context(|| format!("Failed to read wishlist tab '{}'", tab.title))?;

        // the tab is never cleared: rows are overwritten from A1 and leftovers blanked
        let mut rows = to_rows(entries);
        let width = existing
            .iter()
            .map(|r| r.len())
            .max()
            .unwrap_or(0)
            .max(WISHLIST_HEADER.len());
        for row in rows.iter_mut() {
            row.resize(width, Value::from(""));
        }
        while rows.len() < existing.len() {
            rows.push(vec![Value::from(""); width]);
        }

        let needed_rows = rows.len() as u32;
        let needed_cols = width as u32;
        if tab.row_count < needed_rows || tab.column_count < needed_cols {
            self.service
                .resize_tab(
                    &id,
                    tab.sheet_id,
                    needed_rows.max(tab.row_count),
                    needed_cols.max(tab.column_count),
                )
                .await?;
        }

        self.service
            .write_rows(&id, &tab.title, &rows)
            .await
            .with_context(|| format!("Failed to write wishlist tab '{}'", tab.title))?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("spreadsheet '{}'", self.spreadsheet_title)
    }
}
