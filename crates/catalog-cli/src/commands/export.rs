use crate::commands::export_ui::ExportUI;
use crate::commands::{sheets_client, wishlist_store};
use crate::output::Output;
use catalog_config::Config;
use catalog_core::{
    output_path, write_workbook, CatalogExporter, CategoryStats, ReportBuilder, ReportSync, ShowSummary, SyncSummary,
    Wishlist,
};
use catalog_sources::PlexClient;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub async fn run_export(config: &Config, output_dir: Option<PathBuf>, no_sync: bool, output: &Output) -> Result<()> {
    let connection = config.require_plex()?;
    let plex = PlexClient::connect(&connection)
        .await
        .map_err(|e| eyre!("Failed to connect to Plex at {}: {:#}", connection.base_url, e))?;
    output.info(format!("Connected to {}", plex.server_name()));

    let ui = ExportUI::new(output.is_quiet() || output.is_json());
    let catalog = CatalogExporter::new(&plex)
        .ignore_libraries(&config.report.ignore_libraries)
        .with_observer(&ui)
        .collect()
        .await
        .map_err(|e| eyre!("Export failed: {:#}", e))?;
    if ui.skipped() > 0 {
        output.warn(format!("{} items skipped, see log for details", ui.skipped()));
    }

    let sheets = sheets_client(config).map_err(|e| eyre!("{:#}", e))?;

    // a missing wishlist only costs the Wishlist sheet its rows
    let wishlist_entries = match wishlist_store(config, sheets.clone()) {
        Ok(store) => Wishlist::new(store).list().await.unwrap_or_else(|e| {
            warn!("Could not load wishlist: {}", e);
            Vec::new()
        }),
        Err(e) => {
            warn!("Could not open wishlist store: {:#}", e);
            Vec::new()
        }
    };

    let report = ReportBuilder::new(&catalog)
        .with_wishlist(&wishlist_entries)
        .build();

    let base = output_dir.unwrap_or_else(|| config.report.output_dir.clone());
    let path = output_path(&base, chrono::Local::now());
    write_workbook(&report, &path)?;
    info!("Workbook written to {}", path.display());

    let sync = match (&config.google.report_sheet, no_sync) {
        (Some(title), false) => match &sheets {
            Some(client) => Some(ReportSync::new(client.as_ref(), title.clone()).push(&report).await?),
            None => {
                output.warn(format!(
                    "Skipping sync to '{}': no credentials at {}",
                    title,
                    config.google.credentials_file.display()
                ));
                None
            }
        },
        _ => None,
    };

    let movie_stats = catalog.movie_stats();
    let shows = catalog.show_summaries();
    let show_total = (!shows.is_empty()).then(|| ShowSummary::total(&shows));

    if output.is_json() {
        output.json(&summary_json(&path, &movie_stats, show_total.as_ref(), catalog.skipped.len(), sync.as_ref()));
    } else {
        output.table(&summary_table(&movie_stats, show_total.as_ref()));
        output.success(format!("Workbook saved to {}", path.display()));
        if let Some(summary) = &sync {
            output.success(format!(
                "Synced {} sheets ({} new)",
                summary.created.len() + summary.updated.len(),
                summary.created.len()
            ));
        }
    }

    if let Some(summary) = sync.filter(|s| !s.is_success()) {
        for (tab, error) in &summary.failed {
            output.error(format!("Sheet '{}' failed to sync: {}", tab, error));
        }
        return Err(eyre!("{} sheets failed to sync", summary.failed.len()));
    }
    Ok(())
}

/// Per-category backup coverage, with a grand total and a TV row when the
/// server has shows
pub(crate) fn summary_table(movie_stats: &[CategoryStats], show_total: Option<&ShowSummary>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Category").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Items").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Backed Up").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("% Backed Up").add_attribute(comfy_table::Attribute::Bold),
        ]);

    let total = CategoryStats::grand_total("Total", movie_stats);
    for stats in movie_stats.iter().chain(std::iter::once(&total)) {
        table.add_row(vec![
            Cell::new(&stats.name),
            Cell::new(stats.total_items),
            Cell::new(stats.backed_items),
            Cell::new(format!("{:.1}", stats.percent_backed_up())),
        ]);
    }
    if let Some(tv) = show_total {
        table.add_row(vec![
            Cell::new("TV Episodes"),
            Cell::new(tv.total_episodes),
            Cell::new(tv.backed_episodes),
            Cell::new(format!("{:.1}", tv.percent())),
        ]);
    }
    table
}

pub(crate) fn summary_json(
    path: &Path,
    movie_stats: &[CategoryStats],
    show_total: Option<&ShowSummary>,
    skipped: usize,
    sync: Option<&SyncSummary>,
) -> serde_json::Value {
    let total = CategoryStats::grand_total("Total", movie_stats);
    json!({
        "workbook": path.display().to_string(),
        "movies": {
            "libraries": movie_stats.iter().map(|s| json!({
                "name": s.name,
                "total": s.total_items,
                "backed_up": s.backed_items,
                "percent": s.percent_backed_up(),
            })).collect::<Vec<_>>(),
            "total": total.total_items,
            "backed_up": total.backed_items,
        },
        "episodes": show_total.map(|tv| json!({
            "total": tv.total_episodes,
            "backed_up": tv.backed_episodes,
            "percent": tv.percent(),
        })),
        "skipped": skipped,
        "sync": sync,
    })
}
