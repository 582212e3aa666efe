use crate::library::{EpisodeRecord, LibrarySection, MovieRecord, ShowRecord};
use crate::plex::api::PlexHttpClient;
use crate::traits::LibrarySource;
use anyhow::Result;
use async_trait::async_trait;
use catalog_config::PlexConnection;
use tracing::info;

/// Plex server session, constructed once and handed to the exporter.
pub struct PlexClient {
    api: PlexHttpClient,
    server_name: String,
}

impl PlexClient {
    /// Connect and verify the token against the server root.
    pub async fn connect(connection: &PlexConnection) -> Result<Self> {
        let api = PlexHttpClient::new(&connection.base_url, &connection.token)?;
        let server_name = api.server_name().await?;
        info!("Connected to Plex server '{}' at {}", server_name, api.base_url());
        Ok(Self { api, server_name })
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }
}

#[async_trait]
impl LibrarySource for PlexClient {
    fn source_name(&self) -> &str {
        "plex"
    }

    async fn libraries(&self) -> Result<Vec<LibrarySection>> {
        self.api.get_libraries().await
    }

    async fn movies(&self, section: &LibrarySection) -> Result<Vec<MovieRecord>> {
        self.api.get_movies(&section.key).await
    }

    async fn shows(&self, section: &LibrarySection) -> Result<Vec<ShowRecord>> {
        self.api.get_shows(&section.key).await
    }

    async fn episodes(&self, show: &ShowRecord) -> Result<Vec<EpisodeRecord>> {
        self.api.get_episodes(&show.rating_key).await
    }
}
