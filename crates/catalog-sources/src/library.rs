// Raw records as enumerated from a media server. Every metadata field that
// the server may omit is optional; deciding whether a record is usable is
// the exporter's job, not the client's.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryKind {
    Movie,
    Show,
    Other(String),
}

impl LibraryKind {
    pub fn from_type(type_: &str) -> Self {
        match type_ {
            "movie" => LibraryKind::Movie,
            "show" => LibraryKind::Show,
            other => LibraryKind::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibrarySection {
    pub key: String,
    pub title: String,
    pub kind: LibraryKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieRecord {
    pub rating_key: String,
    pub title: Option<String>,
    /// Label and collection tags as sent by the server; `None` when absent
    pub labels: Option<Vec<String>>,
    /// First part of the first media entry
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowRecord {
    pub rating_key: String,
    pub title: Option<String>,
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeRecord {
    pub rating_key: String,
    pub title: Option<String>,
    pub season: Option<u32>,
    pub index: Option<u32>,
    pub labels: Option<Vec<String>>,
    pub file_path: Option<String>,
}
