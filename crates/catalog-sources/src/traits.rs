use crate::error::SheetsError;
use crate::library::{EpisodeRecord, LibrarySection, MovieRecord, ShowRecord};
use anyhow::Result;
use async_trait::async_trait;

/// Enumerates libraries and their contents from a media server.
#[async_trait]
pub trait LibrarySource: Send + Sync {
    fn source_name(&self) -> &str;

    async fn libraries(&self) -> Result<Vec<LibrarySection>>;
    async fn movies(&self, section: &LibrarySection) -> Result<Vec<MovieRecord>>;
    async fn shows(&self, section: &LibrarySection) -> Result<Vec<ShowRecord>>;
    async fn episodes(&self, show: &ShowRecord) -> Result<Vec<EpisodeRecord>>;
}

/// One row of cell values as sent to the spreadsheet service
pub type SheetRow = Vec<serde_json::Value>;

/// A tab inside a remote spreadsheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub sheet_id: i64,
    pub title: String,
    pub row_count: u32,
    pub column_count: u32,
}

/// Minimal remote spreadsheet surface: tabs addressed by title inside a
/// spreadsheet addressed by id.
#[async_trait]
pub trait SpreadsheetService: Send + Sync {
    /// Resolve a spreadsheet title to its id
    async fn open_by_title(&self, title: &str) -> Result<String, SheetsError>;

    /// Tabs in display order
    async fn tabs(&self, spreadsheet_id: &str) -> Result<Vec<TabInfo>, SheetsError>;

    async fn add_tab(&self, spreadsheet_id: &str, title: &str, rows: u32, cols: u32) -> Result<(), SheetsError>;

    /// Grow or shrink a tab's grid
    async fn resize_tab(&self, spreadsheet_id: &str, sheet_id: i64, rows: u32, cols: u32) -> Result<(), SheetsError>;

    async fn clear_tab(&self, spreadsheet_id: &str, title: &str) -> Result<(), SheetsError>;

    /// Write rows starting at A1
    async fn write_rows(&self, spreadsheet_id: &str, title: &str, rows: &[SheetRow]) -> Result<(), SheetsError>;

    /// All non-empty rows as displayed strings
    async fn read_rows(&self, spreadsheet_id: &str, title: &str) -> Result<Vec<Vec<String>>, SheetsError>;
}
