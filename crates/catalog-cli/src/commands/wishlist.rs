use crate::commands::{sheets_client, wishlist_store};
use crate::output::Output;
use catalog_config::Config;
use catalog_core::{Wishlist, WishlistStore};
use catalog_models::{NewWishlistEntry, WishlistEntry, WishlistPatch};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use serde_json::json;

fn open(config: &Config) -> Result<Wishlist<Box<dyn WishlistStore>>> {
    let sheets = sheets_client(config).map_err(|e| eyre!("{:#}", e))?;
    let store = wishlist_store(config, sheets).map_err(|e| eyre!("{:#}", e))?;
    tracing::debug!("Wishlist store: {}", store.describe());
    Ok(Wishlist::new(store))
}

pub async fn run_list(config: &Config, output: &Output) -> Result<()> {
    let entries = open(config)?.list().await?;

    if output.is_json() {
        output.json(&json!(entries));
        return Ok(());
    }
    if entries.is_empty() {
        output.info("The wishlist is empty.");
        return Ok(());
    }
    output.table(&entries_table(&entries));
    Ok(())
}

pub async fn run_add(config: &Config, title: String, notes: String, format: String, output: &Output) -> Result<()> {
    let entry = open(config)?
        .add(NewWishlistEntry { title, notes, format })
        .await?;
    report(output, "Item added", &entry);
    Ok(())
}

pub async fn run_update(
    config: &Config,
    index: usize,
    title: Option<String>,
    notes: Option<String>,
    format: Option<String>,
    output: &Output,
) -> Result<()> {
    let patch = WishlistPatch { title, notes, format };
    if patch.is_empty() {
        return Err(eyre!("Nothing to update: pass --title, --notes or --format"));
    }
    let entry = open(config)?.update_at(index, patch).await?;
    report(output, "Item updated", &entry);
    Ok(())
}

pub async fn run_delete(config: &Config, index: usize, output: &Output) -> Result<()> {
    let entry = open(config)?.delete_at(index).await?;
    report(output, "Item deleted", &entry);
    Ok(())
}

fn report(output: &Output, message: &str, entry: &WishlistEntry) {
    if output.is_json() {
        output.json(&json!({"message": message, "entry": entry}));
    } else {
        output.success(format!("{}: {}", message, entry.title));
    }
}

pub(crate) fn entries_table(entries: &[WishlistEntry]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Index").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Title").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Notes").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Desired Format").add_attribute(comfy_table::Attribute::Bold),
        ]);
    for (index, entry) in entries.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index),
            Cell::new(&entry.title),
            Cell::new(&entry.notes),
            Cell::new(&entry.format),
        ]);
    }
    table
}
