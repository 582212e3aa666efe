use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Recognized physical/digital backup kinds.
///
/// Variant order is the dashboard column order (DVD, Blue-ray, ISO, Ripped).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackupType {
    Dvd,
    BlueRay,
    Iso,
    Ripped,
}

impl BackupType {
    pub const ALL: [BackupType; 4] = [
        BackupType::Dvd,
        BackupType::BlueRay,
        BackupType::Iso,
        BackupType::Ripped,
    ];

    /// Canonical lowercase label/collection tag
    pub fn tag(self) -> &'static str {
        match self {
            BackupType::Dvd => "dvd",
            BackupType::BlueRay => "blue-ray",
            BackupType::Iso => "iso",
            BackupType::Ripped => "ripped",
        }
    }

    /// Label used in report headers and the joined "Type" column
    pub fn label(self) -> &'static str {
        match self {
            BackupType::Dvd => "DVD",
            BackupType::BlueRay => "Blue-ray",
            BackupType::Iso => "ISO",
            BackupType::Ripped => "Ripped",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }
}

impl fmt::Display for BackupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of classifying one item.
///
/// There is no stored `is_backed` flag: it is derived from the matched set so
/// the two can never disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupResult {
    matched_types: BTreeSet<BackupType>,
}

impl BackupResult {
    pub fn new(matched_types: BTreeSet<BackupType>) -> Self {
        Self { matched_types }
    }

    pub fn not_backed() -> Self {
        Self::default()
    }

    pub fn is_backed(&self) -> bool {
        !self.matched_types.is_empty()
    }

    pub fn matched_types(&self) -> &BTreeSet<BackupType> {
        &self.matched_types
    }

    pub fn contains(&self, backup_type: BackupType) -> bool {
        self.matched_types.contains(&backup_type)
    }

    /// "Yes"/"No" as shown in the Backup column
    pub fn backup_label(&self) -> &'static str {
        if self.is_backed() {
            "Yes"
        } else {
            "No"
        }
    }

    /// Comma-joined display labels, alphabetical by label.
    pub fn display_types(&self) -> String {
        let mut labels: Vec<&str> = self.matched_types.iter().map(|t| t.label()).collect();
        labels.sort_unstable();
        labels.join(", ")
    }
}
