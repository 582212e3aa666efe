//! Sheet-level layout of the catalog workbook.
//!
//! The report is built as plain data first so the same layout can be
//! rendered to `.xlsx` and pushed to a remote spreadsheet.

use crate::export::{Catalog, ClassifiedEpisode, MovieLibrary};
use crate::stats::{CategoryStats, ShowSummary};
use catalog_models::{BackupType, WishlistEntry};
use catalog_sources::SheetRow;
use serde_json::Value;
use std::collections::HashSet;

pub const DASHBOARD_SHEET: &str = "Dashboard";
pub const TV_SHOWS_SHEET: &str = "TV_Shows";
pub const TV_DASHBOARD_SHEET: &str = "TV_Dashboard";
pub const WISHLIST_SHEET: &str = "Wishlist";

/// Longest sheet name the workbook format accepts
pub const MAX_SHEET_NAME_LEN: usize = 31;

const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];
const TOTAL_LABEL: &str = "Total";
const CHART_GAP_ROWS: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn count(value: u64) -> Self {
        CellValue::Number(value as f64)
    }

    pub fn optional_count(value: Option<u32>) -> Self {
        value.map_or(CellValue::Empty, |v| CellValue::Number(v as f64))
    }

    /// Display width in characters, used for column sizing
    pub fn display_len(&self) -> usize {
        match self {
            CellValue::Text(s) => s.chars().count(),
            CellValue::Number(n) => format_number(*n).len(),
            CellValue::Empty => 0,
        }
    }

    /// Whole numbers are sent as integers so remote cells show `3`, not `3.0`
    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Text(s) => Value::from(s.as_str()),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => Value::from(*n as i64),
            CellValue::Number(n) => Value::from(*n),
            CellValue::Empty => Value::from(""),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{:.1}", n)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    General,
    /// `0.0`
    OneDecimal,
}

/// A header label spanning several columns of one header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMerge {
    pub row: u32,
    pub first_col: u16,
    pub last_col: u16,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub rows: Vec<Vec<String>>,
    pub merges: Vec<HeaderMerge>,
}

impl Header {
    pub fn single(columns: &[&str]) -> Self {
        Self {
            rows: vec![columns.iter().map(|c| c.to_string()).collect()],
            merges: Vec::new(),
        }
    }

    pub fn height(&self) -> u32 {
        self.rows.len() as u32
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Zero-based inclusive cell range on the owning sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
}

impl CellRange {
    pub fn row(row: u32, first_col: u16, last_col: u16) -> Self {
        Self {
            first_row: row,
            first_col,
            last_row: row,
            last_col,
        }
    }

    pub fn column(col: u16, first_row: u32, last_row: u32) -> Self {
        Self {
            first_row,
            first_col: col,
            last_row,
            last_col: col,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Column,
    Pie,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub series_name: String,
    pub categories: CellRange,
    pub values: CellRange,
    pub x_axis: Option<String>,
    pub y_axis: Option<String>,
    pub anchor_row: u32,
    pub anchor_col: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub header: Header,
    pub rows: Vec<Vec<CellValue>>,
    pub column_formats: Vec<(u16, NumberFormat)>,
    pub charts: Vec<ChartSpec>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, header: Header) -> Self {
        Self {
            name: name.into(),
            header,
            rows: Vec::new(),
            column_formats: Vec::new(),
            charts: Vec::new(),
        }
    }

    /// Sheet row index of the first data row
    pub fn data_start_row(&self) -> u32 {
        self.header.height()
    }

    /// Sheet row index of the last written row
    pub fn last_row(&self) -> u32 {
        (self.header.height() + self.rows.len() as u32).saturating_sub(1)
    }

    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(self.header.width())
    }

    pub fn column_format(&self, col: u16) -> NumberFormat {
        self.column_formats
            .iter()
            .find(|(c, _)| *c == col)
            .map(|(_, f)| *f)
            .unwrap_or(NumberFormat::General)
    }

    /// Header rows followed by data rows, for a values upload. Merged labels
    /// land in their first column.
    pub fn to_values(&self) -> Vec<SheetRow> {
        let width = self.width();
        let mut values: Vec<SheetRow> = self
            .header
            .rows
            .iter()
            .map(|row| {
                let mut cells: SheetRow = row.iter().map(|c| Value::from(c.as_str())).collect();
                cells.resize(width, Value::from(""));
                cells
            })
            .collect();

        for merge in &self.header.merges {
            if let Some(row) = values.get_mut(merge.row as usize) {
                if let Some(cell) = row.get_mut(merge.first_col as usize) {
                    *cell = Value::from(merge.label.as_str());
                }
            }
        }

        values.extend(self.rows.iter().map(|row| row.iter().map(CellValue::to_json).collect()));
        values
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub sheets: Vec<Sheet>,
}

impl Report {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Replace characters the workbook format forbids in sheet names.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'').trim().to_string();
    if cleaned.is_empty() {
        "Library".to_string()
    } else {
        cleaned
    }
}

/// Clip to `max_chars`, then drop what clipping exposed at the end: the
/// workbook format rejects names that end with an apostrophe.
fn clip(name: &str, max_chars: usize) -> String {
    let clipped: String = name.chars().take(max_chars).collect();
    let trimmed = clipped.trim().trim_matches('\'').trim();
    if trimmed.is_empty() {
        "Library".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Allocates unique, valid sheet names. Comparison is case-insensitive
/// because workbook sheet names are.
#[derive(Debug, Default)]
pub struct SheetNames {
    used: HashSet<String>,
}

impl SheetNames {
    pub fn new() -> Self {
        let mut names = Self::default();
        // reserved by the workbook format
        names.used.insert("history".to_string());
        names
    }

    pub fn reserve(&mut self, name: &str) {
        self.used.insert(name.to_lowercase());
    }

    pub fn allocate(&mut self, wanted: &str) -> String {
        let base = clip(&sanitize_sheet_name(wanted), MAX_SHEET_NAME_LEN);
        let mut candidate = base.clone();
        let mut n = 2;
        while self.used.contains(&candidate.to_lowercase()) {
            let suffix = format!(" ({})", n);
            candidate = format!(
                "{}{}",
                clip(&base, MAX_SHEET_NAME_LEN - suffix.chars().count()),
                suffix
            );
            n += 1;
        }
        self.reserve(&candidate);
        candidate
    }
}

/// Lays out a [`Catalog`] (and optionally the wishlist) as report sheets.
pub struct ReportBuilder<'a> {
    catalog: &'a Catalog,
    wishlist: &'a [WishlistEntry],
}

impl<'a> ReportBuilder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            wishlist: &[],
        }
    }

    pub fn with_wishlist(mut self, entries: &'a [WishlistEntry]) -> Self {
        self.wishlist = entries;
        self
    }

    pub fn build(&self) -> Report {
        let mut names = SheetNames::new();
        for fixed in [DASHBOARD_SHEET, TV_SHOWS_SHEET, TV_DASHBOARD_SHEET, WISHLIST_SHEET] {
            names.reserve(fixed);
        }

        let mut sheets = vec![dashboard_sheet(&self.catalog.movie_stats())];
        for library in &self.catalog.movie_libraries {
            sheets.push(library_sheet(names.allocate(&library.name), library));
        }

        if !self.catalog.episodes.is_empty() {
            sheets.push(tv_shows_sheet(&self.catalog.episodes));
            sheets.push(tv_dashboard_sheet(self.catalog.show_summaries()));
        }

        sheets.push(wishlist_sheet(self.wishlist));
        Report { sheets }
    }
}

fn dashboard_row(stats: &CategoryStats) -> Vec<CellValue> {
    let mut row = vec![CellValue::text(&stats.name), CellValue::count(stats.total_items)];
    row.extend(BackupType::ALL.iter().map(|t| CellValue::count(stats.count(*t))));
    row.push(CellValue::Number(stats.percent_backed_up()));
    row
}

pub fn dashboard_sheet(categories: &[CategoryStats]) -> Sheet {
    let first_type_col: u16 = 2;
    let last_type_col = first_type_col + BackupType::ALL.len() as u16 - 1;
    let percent_col = last_type_col + 1;

    let mut top = vec!["Category".to_string(), "Movie Count".to_string()];
    top.extend(BackupType::ALL.iter().map(|_| String::new()));
    top.push("% Backed Up".to_string());

    let mut second = vec![String::new(), String::new()];
    second.extend(BackupType::ALL.iter().map(|t| t.label().to_string()));
    second.push(String::new());

    let header = Header {
        rows: vec![top, second],
        merges: vec![HeaderMerge {
            row: 0,
            first_col: first_type_col,
            last_col: last_type_col,
            label: "Backup Type".to_string(),
        }],
    };

    let mut sheet = Sheet::new(DASHBOARD_SHEET, header);
    sheet.rows = categories.iter().map(dashboard_row).collect();
    sheet
        .rows
        .push(dashboard_row(&CategoryStats::grand_total(TOTAL_LABEL, categories)));
    sheet.column_formats.push((percent_col, NumberFormat::OneDecimal));

    let total_row = sheet.last_row();
    let categories_range = CellRange::row(1, first_type_col, last_type_col);
    let values_range = CellRange::row(total_row, first_type_col, last_type_col);
    let anchor_row = total_row + 1 + CHART_GAP_ROWS;
    sheet.charts.push(ChartSpec {
        kind: ChartKind::Column,
        title: "Total Backup Type Counts".to_string(),
        series_name: TOTAL_LABEL.to_string(),
        categories: categories_range,
        values: values_range,
        x_axis: Some("Backup Type".to_string()),
        y_axis: Some("Count".to_string()),
        anchor_row,
        anchor_col: 1,
    });
    sheet.charts.push(ChartSpec {
        kind: ChartKind::Pie,
        title: "Backup Type Distribution".to_string(),
        series_name: TOTAL_LABEL.to_string(),
        categories: categories_range,
        values: values_range,
        x_axis: None,
        y_axis: None,
        anchor_row,
        anchor_col: 10,
    });
    sheet
}

pub fn library_sheet(name: String, library: &MovieLibrary) -> Sheet {
    let mut sheet = Sheet::new(
        name,
        Header::single(&["Title", "Backup", "Type", "Path", "% Backed Up"]),
    );
    for classified in &library.items {
        sheet.rows.push(vec![
            CellValue::text(&classified.item.title),
            CellValue::text(classified.result.backup_label()),
            CellValue::text(classified.result.display_types()),
            CellValue::text(&classified.item.file_path),
            CellValue::Empty,
        ]);
    }

    let stats = library.stats();
    sheet.rows.push(vec![
        CellValue::text(TOTAL_LABEL),
        CellValue::count(stats.backed_items),
        CellValue::text(""),
        CellValue::text(""),
        CellValue::Number(stats.percent_backed_up()),
    ]);
    sheet.column_formats.push((4, NumberFormat::OneDecimal));
    sheet
}

pub fn tv_shows_sheet(episodes: &[ClassifiedEpisode]) -> Sheet {
    let mut sheet = Sheet::new(
        TV_SHOWS_SHEET,
        Header::single(&[
            "Show Title",
            "Season",
            "Episode",
            "Episode Title",
            "Backup",
            "Type",
            "Path",
        ]),
    );
    sheet.rows = episodes
        .iter()
        .map(|e| {
            vec![
                CellValue::text(&e.show_title),
                CellValue::optional_count(e.season),
                CellValue::optional_count(e.episode),
                CellValue::text(&e.item.title),
                CellValue::text(e.result.backup_label()),
                CellValue::text(e.result.display_types()),
                CellValue::text(&e.item.file_path),
            ]
        })
        .collect();
    sheet
}

fn show_row(summary: &ShowSummary) -> Vec<CellValue> {
    vec![
        CellValue::text(&summary.show_title),
        CellValue::count(summary.total_episodes),
        CellValue::count(summary.backed_episodes),
        CellValue::Number(summary.percent()),
    ]
}

pub fn tv_dashboard_sheet(mut summaries: Vec<ShowSummary>) -> Sheet {
    summaries.sort_by(|a, b| {
        a.show_title
            .to_lowercase()
            .cmp(&b.show_title.to_lowercase())
            .then_with(|| a.show_title.cmp(&b.show_title))
    });

    let mut sheet = Sheet::new(
        TV_DASHBOARD_SHEET,
        Header::single(&["Show", "Episodes", "Backed Up", "% Backed Up"]),
    );
    sheet.rows = summaries.iter().map(show_row).collect();
    sheet.rows.push(show_row(&ShowSummary::total(&summaries)));
    sheet.column_formats.push((3, NumberFormat::OneDecimal));

    if !summaries.is_empty() {
        let first = sheet.data_start_row();
        let last = first + summaries.len() as u32 - 1;
        sheet.charts.push(ChartSpec {
            kind: ChartKind::Column,
            title: "Backed Up Episodes by Show".to_string(),
            series_name: "Backed Up".to_string(),
            categories: CellRange::column(0, first, last),
            values: CellRange::column(2, first, last),
            x_axis: Some("Show".to_string()),
            y_axis: Some("Episodes".to_string()),
            anchor_row: sheet.last_row() + 1 + CHART_GAP_ROWS,
            anchor_col: 1,
        });
    }
    sheet
}

pub fn wishlist_sheet(entries: &[WishlistEntry]) -> Sheet {
    let mut sheet = Sheet::new(
        WISHLIST_SHEET,
        Header::single(&["Title", "Notes", "Desired Format"]),
    );
    sheet.rows = entries
        .iter()
        .map(|e| {
            vec![
                CellValue::text(&e.title),
                CellValue::text(&e.notes),
                CellValue::text(&e.format),
            ]
        })
        .collect();
    sheet
}
