use crate::classify::classify_item;
use crate::stats::{aggregate, summarize_shows, CategoryStats, ShowSummary};
use crate::tags::{episode_tags, extract_tags};
use anyhow::{Context, Result};
use catalog_models::{BackupResult, MediaItem};
use catalog_sources::{EpisodeRecord, LibraryKind, LibrarySection, LibrarySource, MovieRecord};
use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const WORKBOOK_FILE_NAME: &str = "plex_media_catalog.xlsx";

/// Why an enumerated record did not make it into the catalog
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum SkipReason {
    #[error("missing title")]
    MissingTitle,
    #[error("missing file path")]
    MissingFilePath,
    #[error("fetch failed: {0}")]
    FetchFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    pub library: String,
    pub title: String,
    pub reason: SkipReason,
}

/// Result of turning a raw record into a classifiable item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    Item(MediaItem),
    Skip(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedItem {
    pub item: MediaItem,
    pub result: BackupResult,
}

impl ClassifiedItem {
    pub fn new(item: MediaItem) -> Self {
        let result = classify_item(&item);
        Self { item, result }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieLibrary {
    pub name: String,
    pub items: Vec<ClassifiedItem>,
}

impl MovieLibrary {
    pub fn stats(&self) -> CategoryStats {
        aggregate(self.name.clone(), self.items.iter().map(|i| &i.result))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedEpisode {
    pub show_title: String,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub item: MediaItem,
    pub result: BackupResult,
}

/// Everything enumerated in one export run, fully classified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub movie_libraries: Vec<MovieLibrary>,
    pub episodes: Vec<ClassifiedEpisode>,
    pub skipped: Vec<SkippedItem>,
}

impl Catalog {
    /// One entry per movie library, in enumeration order
    pub fn movie_stats(&self) -> Vec<CategoryStats> {
        self.movie_libraries.iter().map(MovieLibrary::stats).collect()
    }

    pub fn show_summaries(&self) -> Vec<ShowSummary> {
        summarize_shows(
            self.episodes
                .iter()
                .map(|e| (e.show_title.as_str(), &e.result)),
        )
    }

    pub fn movie_count(&self) -> usize {
        self.movie_libraries.iter().map(|l| l.items.len()).sum()
    }
}

pub fn extract_movie(record: &MovieRecord) -> Extracted {
    let Some(title) = non_empty(record.title.as_deref()) else {
        return Extracted::Skip(SkipReason::MissingTitle);
    };
    let Some(file_path) = non_empty(record.file_path.as_deref()) else {
        return Extracted::Skip(SkipReason::MissingFilePath);
    };
    Extracted::Item(MediaItem::new(
        title,
        extract_tags(record.labels.as_deref()),
        file_path,
    ))
}

/// Episodes keep an empty title rather than being skipped; only the file
/// path is mandatory.
pub fn extract_episode(record: &EpisodeRecord, show_tags: &BTreeSet<String>) -> Extracted {
    let Some(file_path) = non_empty(record.file_path.as_deref()) else {
        return Extracted::Skip(SkipReason::MissingFilePath);
    };
    Extracted::Item(MediaItem::new(
        record.title.clone().unwrap_or_default(),
        episode_tags(record.labels.as_deref(), show_tags),
        file_path,
    ))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// `<base>/<YYYY-mm-dd_HH-MM-SS>/plex_media_catalog.xlsx`
pub fn output_path<Tz>(base: &Path, now: DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    base.join(now.format("%Y-%m-%d_%H-%M-%S").to_string())
        .join(WORKBOOK_FILE_NAME)
}

/// Progress hooks for a long enumeration. All methods default to no-ops.
pub trait ExportObserver: Send + Sync {
    fn library_started(&self, _section: &LibrarySection) {}
    fn library_finished(&self, _section: &LibrarySection, _items: usize) {}
    fn item_skipped(&self, _item: &SkippedItem) {}
}

pub struct NoopObserver;

impl ExportObserver for NoopObserver {}

/// Walks every movie and show library of a source and classifies what it
/// finds.
pub struct CatalogExporter<'a, S: LibrarySource + ?Sized> {
    source: &'a S,
    ignored: &'a [String],
    observer: &'a dyn ExportObserver,
}

impl<'a, S: LibrarySource + ?Sized> CatalogExporter<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            ignored: &[],
            observer: &NoopObserver,
        }
    }

    /// Library titles to leave out entirely
    pub fn ignore_libraries(mut self, names: &'a [String]) -> Self {
        self.ignored = names;
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn ExportObserver) -> Self {
        self.observer = observer;
        self
    }

    fn is_ignored(&self, section: &LibrarySection) -> bool {
        self.ignored.iter().any(|name| name == &section.title)
    }

    pub async fn collect(&self) -> Result<Catalog> {
        let sections = self
            .source
            .libraries()
            .await
            .with_context(|| format!("Failed to list {} libraries", self.source.source_name()))?;

        let mut catalog = Catalog::default();
        for section in &sections {
            if self.is_ignored(section) {
                info!("Skipping ignored library '{}'", section.title);
                continue;
            }
            match &section.kind {
                LibraryKind::Movie => self.collect_movies(section, &mut catalog).await,
                LibraryKind::Show => self.collect_shows(section, &mut catalog).await,
                LibraryKind::Other(kind) => {
                    debug!("Skipping library '{}' of type {}", section.title, kind);
                }
            }
        }

        info!(
            "Catalog collected: {} movies in {} libraries, {} episodes, {} skipped",
            catalog.movie_count(),
            catalog.movie_libraries.len(),
            catalog.episodes.len(),
            catalog.skipped.len()
        );
        Ok(catalog)
    }

    fn skip(&self, catalog: &mut Catalog, library: &str, title: &str, reason: SkipReason) {
        warn!("Skipping '{}' in '{}': {}", title, library, reason);
        let skipped = SkippedItem {
            library: library.to_string(),
            title: title.to_string(),
            reason,
        };
        self.observer.item_skipped(&skipped);
        catalog.skipped.push(skipped);
    }

    async fn collect_movies(&self, section: &LibrarySection, catalog: &mut Catalog) {
        info!("Processing movie library '{}'", section.title);
        self.observer.library_started(section);

        let records = match self.source.movies(section).await {
            Ok(records) => records,
            Err(e) => {
                let reason = SkipReason::FetchFailed(format!("{:#}", e));
                self.skip(catalog, &section.title, &section.title, reason);
                self.observer.library_finished(section, 0);
                return;
            }
        };

        let mut items = Vec::with_capacity(records.len());
        for record in &records {
            match extract_movie(record) {
                Extracted::Item(item) => items.push(ClassifiedItem::new(item)),
                Extracted::Skip(reason) => {
                    let title = record.title.as_deref().unwrap_or(&record.rating_key);
                    self.skip(catalog, &section.title, title, reason);
                }
            }
        }

        info!("Library '{}': {} movies classified", section.title, items.len());
        self.observer.library_finished(section, items.len());
        catalog.movie_libraries.push(MovieLibrary {
            name: section.title.clone(),
            items,
        });
    }

    async fn collect_shows(&self, section: &LibrarySection, catalog: &mut Catalog) {
        info!("Processing show library '{}'", section.title);
        self.observer.library_started(section);

        let shows = match self.source.shows(section).await {
            Ok(shows) => shows,
            Err(e) => {
                let reason = SkipReason::FetchFailed(format!("{:#}", e));
                self.skip(catalog, &section.title, &section.title, reason);
                self.observer.library_finished(section, 0);
                return;
            }
        };

        let before = catalog.episodes.len();
        for show in &shows {
            let Some(show_title) = non_empty(show.title.as_deref()) else {
                self.skip(catalog, &section.title, &show.rating_key, SkipReason::MissingTitle);
                continue;
            };

            let episodes = match self.source.episodes(show).await {
                Ok(episodes) => episodes,
                Err(e) => {
                    let reason = SkipReason::FetchFailed(format!("{:#}", e));
                    self.skip(catalog, &section.title, show_title, reason);
                    continue;
                }
            };

            let show_tags = extract_tags(show.labels.as_deref());
            for record in &episodes {
                match extract_episode(record, &show_tags) {
                    Extracted::Item(item) => {
                        let result = classify_item(&item);
                        catalog.episodes.push(ClassifiedEpisode {
                            show_title: show_title.to_string(),
                            season: record.season,
                            episode: record.index,
                            item,
                            result,
                        });
                    }
                    Extracted::Skip(reason) => {
                        let title = format!(
                            "{} - {}",
                            show_title,
                            record.title.as_deref().unwrap_or(&record.rating_key)
                        );
                        self.skip(catalog, &section.title, &title, reason);
                    }
                }
            }
        }

        let added = catalog.episodes.len() - before;
        info!("Library '{}': {} episodes from {} shows", section.title, added, shows.len());
        self.observer.library_finished(section, added);
    }
}
