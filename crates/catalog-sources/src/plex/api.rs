use crate::library::{EpisodeRecord, LibraryKind, LibrarySection, MovieRecord, ShowRecord};
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

const CLIENT_IDENTIFIER: &str = "plex-catalog";

pub struct PlexHttpClient {
    client: Client,
    base_url: String,
}

impl PlexHttpClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let client = Client::builder()
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers.insert(
                    reqwest::header::HeaderName::from_static("x-plex-token"),
                    reqwest::header::HeaderValue::from_str(token)
                        .context("Invalid token format")?,
                );
                headers.insert(
                    reqwest::header::HeaderName::from_static("x-plex-client-identifier"),
                    reqwest::header::HeaderValue::from_static(CLIENT_IDENTIFIER),
                );
                headers
            })
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json(&self, path: &str, what: &str) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Plex GET {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to get {}", what))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("Plex returned {} for {}", status, what));
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", what))
    }

    /// Server friendly name; doubles as a token check
    pub async fn server_name(&self) -> Result<String> {
        let json = self.get_json("/", "server identity").await?;
        Ok(json
            .get("MediaContainer")
            .and_then(|mc| mc.get("friendlyName"))
            .and_then(|n| n.as_str())
            .unwrap_or("Plex")
            .to_string())
    }

    pub async fn get_libraries(&self) -> Result<Vec<LibrarySection>> {
        let json = self.get_json("/library/sections", "libraries").await?;
        Ok(parse_sections(&json))
    }

    pub async fn get_movies(&self, library_key: &str) -> Result<Vec<MovieRecord>> {
        let path = format!("/library/sections/{}/all?type=1", library_key);
        let json = self.get_json(&path, "movies").await?;
        let movies: Vec<MovieRecord> = metadata_items(&json).filter_map(parse_movie).collect();
        debug!("Plex get_movies: {} items in library {}", movies.len(), library_key);
        Ok(movies)
    }

    pub async fn get_shows(&self, library_key: &str) -> Result<Vec<ShowRecord>> {
        let path = format!("/library/sections/{}/all?type=2", library_key);
        let json = self.get_json(&path, "shows").await?;
        let shows: Vec<ShowRecord> = metadata_items(&json).filter_map(parse_show).collect();
        debug!("Plex get_shows: {} items in library {}", shows.len(), library_key);
        Ok(shows)
    }

    /// Every episode of a show across all seasons
    pub async fn get_episodes(&self, show_rating_key: &str) -> Result<Vec<EpisodeRecord>> {
        let path = format!("/library/metadata/{}/allLeaves", show_rating_key);
        let json = self.get_json(&path, "episodes").await?;
        Ok(metadata_items(&json).filter_map(parse_episode).collect())
    }
}

fn metadata_items(json: &Value) -> impl Iterator<Item = &Value> {
    json.get("MediaContainer")
        .and_then(|mc| mc.get("Metadata"))
        .and_then(|m| m.as_array())
        .map(|a| a.iter())
        .into_iter()
        .flatten()
}

fn str_field(item: &Value, key: &str) -> Option<String> {
    item.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

/// Plex sends numeric ids as strings or numbers depending on endpoint
fn key_field(item: &Value, key: &str) -> Option<String> {
    match item.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn u32_field(item: &Value, key: &str) -> Option<u32> {
    item.get(key).and_then(|v| v.as_u64()).map(|v| v as u32)
}

pub(crate) fn parse_sections(json: &Value) -> Vec<LibrarySection> {
    let Some(directories) = json
        .get("MediaContainer")
        .and_then(|mc| mc.get("Directory"))
        .and_then(|d| d.as_array())
    else {
        debug!("Plex get_libraries: No Directory field in MediaContainer");
        return Vec::new();
    };

    directories
        .iter()
        .filter_map(|dir| {
            let key = key_field(dir, "key")?;
            let title = str_field(dir, "title").unwrap_or_default();
            let type_ = str_field(dir, "type").unwrap_or_default();
            Some(LibrarySection {
                key,
                title,
                kind: LibraryKind::from_type(&type_),
            })
        })
        .collect()
}

/// Label and collection tags. `None` when the item carries neither field,
/// which is distinct from carrying empty lists.
pub(crate) fn parse_tags(item: &Value) -> Option<Vec<String>> {
    let mut found = false;
    let mut tags = Vec::new();
    for field in ["Label", "Collection"] {
        if let Some(entries) = item.get(field).and_then(|v| v.as_array()) {
            found = true;
            tags.extend(entries.iter().filter_map(|e| str_field(e, "tag")));
        }
    }
    found.then_some(tags)
}

pub(crate) fn parse_file_path(item: &Value) -> Option<String> {
    item.get("Media")?
        .as_array()?
        .first()?
        .get("Part")?
        .as_array()?
        .first()
        .and_then(|part| str_field(part, "file"))
        .filter(|f| !f.is_empty())
}

pub(crate) fn parse_movie(item: &Value) -> Option<MovieRecord> {
    Some(MovieRecord {
        rating_key: key_field(item, "ratingKey")?,
        title: str_field(item, "title"),
        labels: parse_tags(item),
        file_path: parse_file_path(item),
    })
}

pub(crate) fn parse_show(item: &Value) -> Option<ShowRecord> {
    Some(ShowRecord {
        rating_key: key_field(item, "ratingKey")?,
        title: str_field(item, "title"),
        labels: parse_tags(item),
    })
}

pub(crate) fn parse_episode(item: &Value) -> Option<EpisodeRecord> {
    Some(EpisodeRecord {
        rating_key: key_field(item, "ratingKey")?,
        title: str_field(item, "title"),
        season: u32_field(item, "parentIndex"),
        index: u32_field(item, "index"),
        labels: parse_tags(item),
        file_path: parse_file_path(item),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_sections() {
        let json = json!({
            "MediaContainer": {
                "Directory": [
                    {"key": "1", "type": "movie", "title": "Movies"},
                    {"key": 2, "type": "show", "title": "TV Shows"},
                    {"key": "3", "type": "artist", "title": "Music"},
                    {"type": "movie", "title": "No key"}
                ]
            }
        });
        let sections = parse_sections(&json);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].kind, LibraryKind::Movie);
        assert_eq!(sections[1].key, "2");
        assert_eq!(sections[1].kind, LibraryKind::Show);
        assert_eq!(sections[2].kind, LibraryKind::Other("artist".to_string()));
    }

    #[test]
    fn test_parse_movie_with_labels_and_collections() {
        let item = json!({
            "ratingKey": "101",
            "title": "Alien",
            "Label": [{"tag": "DVD"}],
            "Collection": [{"tag": "Ripped"}, {"id": 4}],
            "Media": [{"Part": [{"file": "/movies/Alien (1979)/alien.mkv"}]}]
        });
        let movie = parse_movie(&item).unwrap();
        assert_eq!(movie.title.as_deref(), Some("Alien"));
        assert_eq!(movie.labels, Some(vec!["DVD".to_string(), "Ripped".to_string()]));
        assert_eq!(movie.file_path.as_deref(), Some("/movies/Alien (1979)/alien.mkv"));
    }

    #[test]
    fn test_parse_movie_tolerates_missing_metadata() {
        let item = json!({"ratingKey": 7, "title": "Bare"});
        let movie = parse_movie(&item).unwrap();
        assert_eq!(movie.rating_key, "7");
        assert_eq!(movie.labels, None);
        assert_eq!(movie.file_path, None);

        let empty_media = json!({"ratingKey": "8", "Media": []});
        assert_eq!(parse_movie(&empty_media).unwrap().file_path, None);

        assert!(parse_movie(&json!({"title": "no key"})).is_none());
    }

    #[test]
    fn test_parse_episode() {
        let item = json!({
            "ratingKey": "900",
            "title": "Pilot",
            "parentIndex": 1,
            "index": 2,
            "Media": [{"Part": [{"file": "/tv/Show/S01E02.vob"}]}]
        });
        let episode = parse_episode(&item).unwrap();
        assert_eq!(episode.season, Some(1));
        assert_eq!(episode.index, Some(2));
        assert_eq!(episode.labels, None);
        assert_eq!(episode.file_path.as_deref(), Some("/tv/Show/S01E02.vob"));
    }

    #[test]
    fn test_metadata_items_missing_container() {
        assert_eq!(metadata_items(&json!({})).count(), 0);
        assert_eq!(metadata_items(&json!({"MediaContainer": {"size": 0}})).count(), 0);
    }
}
