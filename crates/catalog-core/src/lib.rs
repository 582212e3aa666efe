pub mod classify;
pub mod export;
pub mod render;
pub mod report;
pub mod stats;
pub mod sync;
pub mod tags;
pub mod wishlist;

#[cfg(test)]
pub(crate) mod testing;

pub use classify::{classify, classify_item};
pub use export::{
    extract_episode, extract_movie, output_path, Catalog, CatalogExporter, ClassifiedEpisode,
    ClassifiedItem, ExportObserver, Extracted, MovieLibrary, NoopObserver, SkipReason, SkippedItem,
};
pub use render::{render_to_buffer, write_workbook, RenderError};
pub use report::{CellValue, ChartKind, ChartSpec, Header, Report, ReportBuilder, Sheet};
pub use stats::{aggregate, summarize_shows, CategoryStats, ShowSummary};
pub use sync::{ReportSync, SyncSummary};
pub use tags::{episode_tags, extract_tags};
pub use wishlist::{
    JsonFileWishlistStore, MemoryWishlistStore, SheetWishlistStore, Wishlist, WishlistError,
    WishlistStore,
};
