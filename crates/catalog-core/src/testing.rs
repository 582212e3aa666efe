//! In-memory fakes of the remote services, shared by the unit tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use catalog_sources::{
    EpisodeRecord, LibraryKind, LibrarySection, LibrarySource, MovieRecord, SheetRow, SheetsError,
    ShowRecord, SpreadsheetService, TabInfo,
};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

fn labels(values: Option<&[&str]>) -> Option<Vec<String>> {
    values.map(|v| v.iter().map(|s| s.to_string()).collect())
}

pub fn movie(key: &str, title: Option<&str>, tags: Option<&[&str]>, path: Option<&str>) -> MovieRecord {
    MovieRecord {
        rating_key: key.to_string(),
        title: title.map(str::to_string),
        labels: labels(tags),
        file_path: path.map(str::to_string),
    }
}

pub fn show(key: &str, title: Option<&str>, tags: Option<&[&str]>) -> ShowRecord {
    ShowRecord {
        rating_key: key.to_string(),
        title: title.map(str::to_string),
        labels: labels(tags),
    }
}

pub fn episode(
    key: &str,
    title: Option<&str>,
    season: u32,
    index: u32,
    tags: Option<&[&str]>,
    path: Option<&str>,
) -> EpisodeRecord {
    EpisodeRecord {
        rating_key: key.to_string(),
        title: title.map(str::to_string),
        season: Some(season),
        index: Some(index),
        labels: labels(tags),
        file_path: path.map(str::to_string),
    }
}

type EpisodeFetch = Result<Vec<EpisodeRecord>, String>;

#[derive(Default)]
pub struct FakeLibrary {
    sections: Vec<LibrarySection>,
    movies: HashMap<String, Vec<MovieRecord>>,
    shows: HashMap<String, Vec<ShowRecord>>,
    episodes: HashMap<String, EpisodeFetch>,
    fail_listing: bool,
}

impl FakeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_listing: true,
            ..Self::default()
        }
    }

    fn add_section(&mut self, title: &str, kind: LibraryKind) -> String {
        let key = (self.sections.len() + 1).to_string();
        self.sections.push(LibrarySection {
            key: key.clone(),
            title: title.to_string(),
            kind,
        });
        key
    }

    pub fn with_movies(mut self, title: &str, records: Vec<MovieRecord>) -> Self {
        let key = self.add_section(title, LibraryKind::Movie);
        self.movies.insert(key, records);
        self
    }

    pub fn with_shows(mut self, title: &str, shows: Vec<(ShowRecord, EpisodeFetch)>) -> Self {
        let key = self.add_section(title, LibraryKind::Show);
        let mut records = Vec::new();
        for (show, episodes) in shows {
            self.episodes.insert(show.rating_key.clone(), episodes);
            records.push(show);
        }
        self.shows.insert(key, records);
        self
    }

    pub fn with_other(mut self, title: &str, kind: &str) -> Self {
        self.add_section(title, LibraryKind::Other(kind.to_string()));
        self
    }
}

#[async_trait]
impl LibrarySource for FakeLibrary {
    fn source_name(&self) -> &str {
        "fake"
    }

    async fn libraries(&self) -> Result<Vec<LibrarySection>> {
        if self.fail_listing {
            return Err(anyhow!("connection refused"));
        }
        Ok(self.sections.clone())
    }

    async fn movies(&self, section: &LibrarySection) -> Result<Vec<MovieRecord>> {
        Ok(self.movies.get(&section.key).cloned().unwrap_or_default())
    }

    async fn shows(&self, section: &LibrarySection) -> Result<Vec<ShowRecord>> {
        Ok(self.shows.get(&section.key).cloned().unwrap_or_default())
    }

    async fn episodes(&self, show: &ShowRecord) -> Result<Vec<EpisodeRecord>> {
        match self.episodes.get(&show.rating_key) {
            Some(Ok(episodes)) => Ok(episodes.clone()),
            Some(Err(message)) => Err(anyhow!(message.clone())),
            None => Ok(Vec::new()),
        }
    }
}

pub struct FakeTab {
    pub info: TabInfo,
    pub values: Vec<SheetRow>,
}

#[derive(Default)]
struct FakeState {
    tabs: Vec<FakeTab>,
    calls: Vec<String>,
    failing_tabs: HashSet<String>,
}

/// A single spreadsheet held in memory. Writes beyond the tab's grid fail
/// the way the real service does.
pub struct FakeSpreadsheet {
    title: String,
    state: Mutex<FakeState>,
}

pub const FAKE_SPREADSHEET_ID: &str = "spreadsheet-1";

impl FakeSpreadsheet {
    pub fn new(title: &str) -> Self {
        let sheet = Self {
            title: title.to_string(),
            state: Mutex::new(FakeState::default()),
        };
        sheet.insert_tab("Sheet1", 1000, 26);
        sheet
    }

    fn insert_tab(&self, title: &str, rows: u32, cols: u32) {
        let mut state = self.state.lock().unwrap();
        let sheet_id = state.tabs.len() as i64;
        state.tabs.push(FakeTab {
            info: TabInfo {
                sheet_id,
                title: title.to_string(),
                row_count: rows,
                column_count: cols,
            },
            values: Vec::new(),
        });
    }

    pub fn with_tab(self, title: &str, rows: u32, cols: u32) -> Self {
        self.insert_tab(title, rows, cols);
        self
    }

    pub fn seed_rows(&self, title: &str, rows: &[&[&str]]) {
        let mut state = self.state.lock().unwrap();
        if let Some(tab) = state.tabs.iter_mut().find(|t| t.info.title == title) {
            tab.values = rows
                .iter()
                .map(|row| row.iter().map(|c| Value::from(*c)).collect())
                .collect();
        }
    }

    pub fn fail_writes_to(&self, title: &str) {
        self.state.lock().unwrap().failing_tabs.insert(title.to_string());
    }

    pub fn tab_titles(&self) -> Vec<String> {
        self.state.lock().unwrap().tabs.iter().map(|t| t.info.title.clone()).collect()
    }

    pub fn tab_info(&self, title: &str) -> Option<TabInfo> {
        let state = self.state.lock().unwrap();
        state.tabs.iter().find(|t| t.info.title == title).map(|t| t.info.clone())
    }

    pub fn values(&self, title: &str) -> Option<Vec<SheetRow>> {
        let state = self.state.lock().unwrap();
        state.tabs.iter().find(|t| t.info.title == title).map(|t| t.values.clone())
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn check_id(&self, spreadsheet_id: &str) -> Result<(), SheetsError> {
        if spreadsheet_id == FAKE_SPREADSHEET_ID {
            Ok(())
        } else {
            Err(SheetsError::Http {
                status: 404,
                body: "unknown spreadsheet".to_string(),
            })
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn missing_tab(title: &str) -> SheetsError {
    SheetsError::Http {
        status: 400,
        body: format!("Unable to parse range: '{}'", title),
    }
}

#[async_trait]
impl SpreadsheetService for FakeSpreadsheet {
    async fn open_by_title(&self, title: &str) -> Result<String, SheetsError> {
        if title == self.title {
            Ok(FAKE_SPREADSHEET_ID.to_string())
        } else {
            Err(SheetsError::SpreadsheetNotFound(title.to_string()))
        }
    }

    async fn tabs(&self, spreadsheet_id: &str) -> Result<Vec<TabInfo>, SheetsError> {
        self.check_id(spreadsheet_id)?;
        Ok(self.state.lock().unwrap().tabs.iter().map(|t| t.info.clone()).collect())
    }

    async fn add_tab(&self, spreadsheet_id: &str, title: &str, rows: u32, cols: u32) -> Result<(), SheetsError> {
        self.check_id(spreadsheet_id)?;
        self.state.lock().unwrap().calls.push(format!("add {}", title));
        self.insert_tab(title, rows, cols);
        Ok(())
    }

    async fn resize_tab(&self, spreadsheet_id: &str, sheet_id: i64, rows: u32, cols: u32) -> Result<(), SheetsError> {
        self.check_id(spreadsheet_id)?;
        let mut state = self.state.lock().unwrap();
        let tab = state
            .tabs
            .iter_mut()
            .find(|t| t.info.sheet_id == sheet_id)
            .ok_or_else(|| missing_tab(&sheet_id.to_string()))?;
        tab.info.row_count = rows;
        tab.info.column_count = cols;
        let title = tab.info.title.clone();
        state.calls.push(format!("resize {}", title));
        Ok(())
    }

    async fn clear_tab(&self, spreadsheet_id: &str, title: &str) -> Result<(), SheetsError> {
        self.check_id(spreadsheet_id)?;
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("clear {}", title));
        let tab = state
            .tabs
            .iter_mut()
            .find(|t| t.info.title == title)
            .ok_or_else(|| missing_tab(title))?;
        tab.values.clear();
        Ok(())
    }

    async fn write_rows(&self, spreadsheet_id: &str, title: &str, rows: &[SheetRow]) -> Result<(), SheetsError> {
        self.check_id(spreadsheet_id)?;
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("write {}", title));
        if state.failing_tabs.contains(title) {
            return Err(SheetsError::Http {
                status: 500,
                body: "backend error".to_string(),
            });
        }
        let tab = state
            .tabs
            .iter_mut()
            .find(|t| t.info.title == title)
            .ok_or_else(|| missing_tab(title))?;
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        if rows.len() as u32 > tab.info.row_count || width > tab.info.column_count {
            return Err(SheetsError::Http {
                status: 400,
                body: "exceeds grid limits".to_string(),
            });
        }
        // like the real service: cells are overwritten from A1, the rest stay
        for (i, row) in rows.iter().enumerate() {
            if tab.values.len() <= i {
                tab.values.push(Vec::new());
            }
            let target = &mut tab.values[i];
            if target.len() < row.len() {
                target.resize(row.len(), Value::Null);
            }
            for (j, cell) in row.iter().enumerate() {
                target[j] = cell.clone();
            }
        }
        while tab.values.last().is_some_and(|row| row.iter().all(is_blank)) {
            tab.values.pop();
        }
        Ok(())
    }

    async fn read_rows(&self, spreadsheet_id: &str, title: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        self.check_id(spreadsheet_id)?;
        let state = self.state.lock().unwrap();
        let tab = state
            .tabs
            .iter()
            .find(|t| t.info.title == title)
            .ok_or_else(|| missing_tab(title))?;
        Ok(tab
            .values
            .iter()
            .map(|row| {
                row.iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        Value::Null => String::new(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .collect())
    }
}
