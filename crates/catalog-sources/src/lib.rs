pub mod error;
pub mod library;
pub mod plex;
pub mod retry;
pub mod sheets;
pub mod traits;

pub use error::SheetsError;
pub use library::{EpisodeRecord, LibraryKind, LibrarySection, MovieRecord, ShowRecord};
pub use plex::PlexClient;
pub use retry::RetryPolicy;
pub use sheets::{GoogleSheetsClient, ServiceAccountKey};
pub use traits::{LibrarySource, SheetRow, SpreadsheetService, TabInfo};
