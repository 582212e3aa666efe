use crate::report::{CellValue, ChartKind, ChartSpec, NumberFormat, Report, Sheet};
use rust_xlsxwriter::{
    Chart, ChartDataLabel, ChartType, Format, FormatAlign, Workbook, Worksheet, XlsxError,
};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

const MAX_COLUMN_WIDTH: usize = 80;
const COLUMN_PADDING: usize = 2;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("XLSX error: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

struct Formats {
    header: Format,
    merged_header: Format,
    one_decimal: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new().set_bold(),
            merged_header: Format::new().set_bold().set_align(FormatAlign::Center),
            one_decimal: Format::new().set_num_format("0.0"),
        }
    }
}

/// Render the report and save it, creating parent directories as needed.
pub fn write_workbook(report: &Report, path: &Path) -> Result<(), RenderError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut workbook = build_workbook(report)?;
    workbook.save(path)?;
    info!("Saved workbook with {} sheets to {}", report.sheets.len(), path.display());
    Ok(())
}

pub fn render_to_buffer(report: &Report) -> Result<Vec<u8>, RenderError> {
    let mut workbook = build_workbook(report)?;
    Ok(workbook.save_to_buffer()?)
}

fn build_workbook(report: &Report) -> Result<Workbook, RenderError> {
    let mut workbook = Workbook::new();
    let formats = Formats::new();

    for sheet in &report.sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        write_sheet(worksheet, sheet, &formats)?;
        debug!("Rendered sheet '{}' ({} rows)", sheet.name, sheet.rows.len());
    }

    Ok(workbook)
}

fn in_merge(sheet: &Sheet, row: u32, col: u16) -> bool {
    sheet
        .header
        .merges
        .iter()
        .any(|m| m.row == row && col >= m.first_col && col <= m.last_col)
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet, formats: &Formats) -> Result<(), RenderError> {
    for (r, row) in sheet.header.rows.iter().enumerate() {
        let r = r as u32;
        for (c, label) in row.iter().enumerate() {
            let c = c as u16;
            if in_merge(sheet, r, c) {
                continue;
            }
            worksheet.write_string_with_format(r, c, label, &formats.header)?;
        }
    }
    for merge in &sheet.header.merges {
        worksheet.merge_range(
            merge.row,
            merge.first_col,
            merge.row,
            merge.last_col,
            &merge.label,
            &formats.merged_header,
        )?;
    }

    let start = sheet.data_start_row();
    for (r, row) in sheet.rows.iter().enumerate() {
        let r = start + r as u32;
        for (c, cell) in row.iter().enumerate() {
            let c = c as u16;
            match cell {
                CellValue::Text(text) => {
                    worksheet.write_string(r, c, text)?;
                }
                CellValue::Number(n) => match sheet.column_format(c) {
                    NumberFormat::OneDecimal => {
                        worksheet.write_number_with_format(r, c, *n, &formats.one_decimal)?;
                    }
                    NumberFormat::General => {
                        worksheet.write_number(r, c, *n)?;
                    }
                },
                CellValue::Empty => {}
            }
        }
    }

    for (col, width) in column_widths(sheet).into_iter().enumerate() {
        worksheet.set_column_width(col as u16, width as f64)?;
    }

    for spec in &sheet.charts {
        let chart = build_chart(&sheet.name, spec);
        worksheet.insert_chart(spec.anchor_row, spec.anchor_col, &chart)?;
    }

    Ok(())
}

/// Widest value per column plus padding, capped. Merged header labels are
/// left out since they span several columns.
pub(crate) fn column_widths(sheet: &Sheet) -> Vec<usize> {
    let mut widths = vec![0usize; sheet.width()];
    for (r, row) in sheet.header.rows.iter().enumerate() {
        for (c, label) in row.iter().enumerate() {
            if !in_merge(sheet, r as u32, c as u16) {
                widths[c] = widths[c].max(label.chars().count());
            }
        }
    }
    for row in &sheet.rows {
        for (c, cell) in row.iter().enumerate() {
            widths[c] = widths[c].max(cell.display_len());
        }
    }
    widths
        .into_iter()
        .map(|w| (w + COLUMN_PADDING).min(MAX_COLUMN_WIDTH))
        .collect()
}

fn build_chart(sheet_name: &str, spec: &ChartSpec) -> Chart {
    let mut chart = match spec.kind {
        ChartKind::Column => Chart::new(ChartType::Column),
        ChartKind::Pie => Chart::new(ChartType::Pie),
    };

    let mut labels = ChartDataLabel::new();
    labels.show_value();

    let categories = (
        sheet_name,
        spec.categories.first_row,
        spec.categories.first_col,
        spec.categories.last_row,
        spec.categories.last_col,
    );
    let values = (
        sheet_name,
        spec.values.first_row,
        spec.values.first_col,
        spec.values.last_row,
        spec.values.last_col,
    );
    chart
        .add_series()
        .set_name(spec.series_name.as_str())
        .set_categories(categories)
        .set_values(values)
        .set_data_label(&labels);

    chart.title().set_name(spec.title.as_str());
    if let Some(name) = &spec.x_axis {
        chart.x_axis().set_name(name.as_str());
    }
    if let Some(name) = &spec.y_axis {
        chart.y_axis().set_name(name.as_str());
    }
    if spec.kind == ChartKind::Column {
        chart.legend().set_hidden();
    }
    chart
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{Catalog, ClassifiedItem, MovieLibrary};
    use crate::report::ReportBuilder;
    use catalog_models::MediaItem;
    use std::collections::BTreeSet;

    fn catalog() -> Catalog {
        let tags: BTreeSet<String> = ["dvd".to_string()].into_iter().collect();
        Catalog {
            movie_libraries: vec![MovieLibrary {
                name: "Movies: Classics".to_string(),
                items: vec![
                    ClassifiedItem::new(MediaItem::new("Casablanca", tags, "/m/casablanca.mkv")),
                    ClassifiedItem::new(MediaItem::new("M", BTreeSet::new(), "/m/".repeat(40))),
                ],
            }],
            ..Catalog::default()
        }
    }

    #[test]
    fn test_render_to_buffer_produces_zip() {
        let report = ReportBuilder::new(&catalog()).build();
        let bytes = render_to_buffer(&report).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_renders_library_name_clipped_at_an_apostrophe() {
        let mut catalog = catalog();
        catalog.movie_libraries[0].name = format!("{}'s Favourite Movies", "A".repeat(30));
        let report = ReportBuilder::new(&catalog).build();
        assert_eq!(report.sheets[1].name, "A".repeat(30));

        let bytes = render_to_buffer(&report).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_write_workbook_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2024-01-01_00-00-00").join("plex_media_catalog.xlsx");
        let report = ReportBuilder::new(&catalog()).build();

        write_workbook(&report, &path).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_column_widths_capped_and_skip_merges() {
        let report = ReportBuilder::new(&catalog()).build();

        let library = &report.sheets[1];
        let widths = column_widths(library);
        assert_eq!(widths[0], "Casablanca".len() + 2);
        assert_eq!(widths[3], 80);

        let dashboard = &report.sheets[0];
        let widths = column_widths(dashboard);
        // "Backup Type" spans C1:F1 and must not widen column C
        assert_eq!(widths[2], "DVD".len() + 2);
    }
}
