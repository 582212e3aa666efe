use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A title the user wants to acquire.
///
/// `id` is a surrogate assigned at creation; position in the list is still
/// what the HTTP and CLI surfaces address, but the id survives reordering.
/// Field aliases accept the column names used by the wishlist spreadsheet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WishlistEntry {
    /// Empty for legacy rows until a store assigns one
    #[serde(default, alias = "Id")]
    pub id: String,
    #[serde(alias = "Title")]
    pub title: String,
    #[serde(default, alias = "Notes")]
    pub notes: String,
    #[serde(default, alias = "Desired Format")]
    pub format: String,
}

impl WishlistEntry {
    pub fn new(entry: NewWishlistEntry) -> Self {
        Self {
            id: new_entry_id(),
            title: entry.title,
            notes: entry.notes,
            format: entry.format,
        }
    }
}

/// Generate a fresh surrogate id for a wishlist entry
pub fn new_entry_id() -> String {
    Uuid::new_v4().to_string()
}

/// Body of an append request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewWishlistEntry {
    #[serde(default, alias = "Title")]
    pub title: String,
    #[serde(default, alias = "Notes")]
    pub notes: String,
    #[serde(default, alias = "Desired Format")]
    pub format: String,
}

/// Partial update: only the supplied fields are overwritten.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WishlistPatch {
    #[serde(default, alias = "Title", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, alias = "Notes", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, alias = "Desired Format", skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl WishlistPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.notes.is_none() && self.format.is_none()
    }

    pub fn apply(&self, entry: &mut WishlistEntry) {
        if let Some(title) = &self.title {
            entry.title = title.clone();
        }
        if let Some(notes) = &self.notes {
            entry.notes = notes.clone();
        }
        if let Some(format) = &self.format {
            entry.format = format.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_only_touches_supplied_fields() {
        let mut entry = WishlistEntry::new(NewWishlistEntry {
            title: "Alien".to_string(),
            notes: "director's cut".to_string(),
            format: "DVD".to_string(),
        });
        let patch = WishlistPatch {
            format: Some("Blue-ray".to_string()),
            ..WishlistPatch::default()
        };
        patch.apply(&mut entry);
        assert_eq!(entry.title, "Alien");
        assert_eq!(entry.notes, "director's cut");
        assert_eq!(entry.format, "Blue-ray");
    }

    #[test]
    fn test_patch_accepts_sheet_column_names() {
        let patch: WishlistPatch =
            serde_json::from_str(r#"{"Desired Format": "ISO"}"#).unwrap();
        assert_eq!(patch.format.as_deref(), Some("ISO"));
        assert!(patch.title.is_none());
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_legacy_entry_without_id() {
        let entry: WishlistEntry =
            serde_json::from_str(r#"{"Title": "Heat", "Notes": "", "Desired Format": "DVD"}"#).unwrap();
        assert_eq!(entry.title, "Heat");
        assert!(entry.id.is_empty());
    }

    #[test]
    fn test_new_entries_get_distinct_ids() {
        let a = WishlistEntry::new(NewWishlistEntry { title: "A".into(), ..Default::default() });
        let b = WishlistEntry::new(NewWishlistEntry { title: "A".into(), ..Default::default() });
        assert_ne!(a.id, b.id);
    }
}
