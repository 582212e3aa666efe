use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One enumerated library item, reduced to what classification needs.
///
/// Tags are always lowercase and deduplicated; the `BTreeSet` keeps them in a
/// stable order so reports built from the same library are byte-identical.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaItem {
    pub title: String,
    pub tags: BTreeSet<String>,
    pub file_path: String,
}

impl MediaItem {
    pub fn new(title: impl Into<String>, tags: BTreeSet<String>, file_path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            tags,
            file_path: file_path.into(),
        }
    }
}
