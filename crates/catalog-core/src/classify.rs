use catalog_models::{BackupResult, BackupType, MediaItem};
use std::collections::BTreeSet;

/// Decide which backup types apply to an item.
///
/// Tags matching a canonical type name count directly. The file path is
/// then inspected as an additive fallback: an `.iso` path implies ISO, and
/// a path mentioning `dvd` or `.vob` implies DVD. Ripped and Blue-ray can
/// only come from tags.
pub fn classify(tags: &BTreeSet<String>, file_path: &str) -> BackupResult {
    let mut matched: BTreeSet<BackupType> =
        tags.iter().filter_map(|tag| BackupType::from_tag(tag)).collect();

    let path = file_path.to_lowercase();
    if path.contains(".iso") {
        matched.insert(BackupType::Iso);
    }
    if path.contains("dvd") || path.contains(".vob") {
        matched.insert(BackupType::Dvd);
    }

    BackupResult::new(matched)
}

pub fn classify_item(item: &MediaItem) -> BackupResult {
    classify(&item.tags, &item.file_path)
}
