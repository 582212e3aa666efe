use crate::report::{Report, Sheet};
use catalog_sources::{SheetsError, SpreadsheetService, TabInfo};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Grid size of a freshly added tab
pub const NEW_TAB_ROWS: u32 = 1000;
pub const NEW_TAB_COLS: u32 = 26;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub spreadsheet_id: String,
    pub created: Vec<String>,
    pub updated: Vec<String>,
    /// Tab name and the error that stopped it
    pub failed: Vec<(String, String)>,
}

impl SyncSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Mirrors a report into a remote spreadsheet, one tab per sheet. Every tab
/// is fully replaced; tabs the report does not name are left alone.
pub struct ReportSync<'a> {
    service: &'a dyn SpreadsheetService,
    spreadsheet_title: String,
}

impl<'a> ReportSync<'a> {
    pub fn new(service: &'a dyn SpreadsheetService, spreadsheet_title: impl Into<String>) -> Self {
        Self {
            service,
            spreadsheet_title: spreadsheet_title.into(),
        }
    }

    /// Push every sheet. Failing to open the spreadsheet is an error; a tab
    /// that fails is recorded in the summary and the rest are still pushed.
    pub async fn push(&self, report: &Report) -> Result<SyncSummary, SheetsError> {
        let spreadsheet_id = self.service.open_by_title(&self.spreadsheet_title).await?;
        info!(
            "Syncing {} sheets to spreadsheet '{}'",
            report.sheets.len(),
            self.spreadsheet_title
        );
        let tabs = self.service.tabs(&spreadsheet_id).await?;

        let mut summary = SyncSummary {
            spreadsheet_id: spreadsheet_id.clone(),
            ..SyncSummary::default()
        };
        for sheet in &report.sheets {
            let existing = tabs.iter().find(|t| t.title == sheet.name);
            match self.push_sheet(&spreadsheet_id, sheet, existing).await {
                Ok(true) => summary.created.push(sheet.name.clone()),
                Ok(false) => summary.updated.push(sheet.name.clone()),
                Err(e) => {
                    warn!("Failed to sync sheet '{}': {}", sheet.name, e);
                    summary.failed.push((sheet.name.clone(), e.to_string()));
                }
            }
        }

        info!(
            "Sync finished: {} updated, {} created, {} failed",
            summary.updated.len(),
            summary.created.len(),
            summary.failed.len()
        );
        Ok(summary)
    }

    /// Returns whether the tab had to be created
    async fn push_sheet(
        &self,
        spreadsheet_id: &str,
        sheet: &Sheet,
        existing: Option<&TabInfo>,
    ) -> Result<bool, SheetsError> {
        let values = sheet.to_values();
        let rows = values.len() as u32;
        let cols = sheet.width() as u32;

        let created = match existing {
            None => {
                self.service
                    .add_tab(
                        spreadsheet_id,
                        &sheet.name,
                        rows.max(NEW_TAB_ROWS),
                        cols.max(NEW_TAB_COLS),
                    )
                    .await?;
                true
            }
            Some(tab) if tab.row_count < rows || tab.column_count < cols => {
                debug!("Growing tab '{}' to {}x{}", tab.title, rows, cols);
                self.service
                    .resize_tab(
                        spreadsheet_id,
                        tab.sheet_id,
                        rows.max(tab.row_count),
                        cols.max(tab.column_count),
                    )
                    .await?;
                false
            }
            Some(_) => false,
        };

        self.service.clear_tab(spreadsheet_id, &sheet.name).await?;
        self.service
            .write_rows(spreadsheet_id, &sheet.name, &values)
            .await?;
        Ok(created)
    }
}
