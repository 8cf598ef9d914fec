//! Lazily resolved movie records.
//!
//! A [`Movie`] starts out knowing only its ID. Reading a field that has
//! not been resolved yet looks the field up in [`FIELD_ROUTES`] and runs
//! the load routine for its [`Source`] (JSON endpoint, HTML page, or
//! inference from the ID). Each source is loaded at most once per movie.

mod page;
mod routes;
mod value;

pub use page::{parse_byte_size, parse_title_year, scrape_page, ScrapedPage};
pub use routes::{fields_for, route_for, Source, FIELD_ROUTES};
pub use value::MovieValue;

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::matcher;
use crate::session::{SessionError, Transport};
use crate::torrent::Torrent;

/// Errors raised while resolving movie fields.
#[derive(Debug, Error)]
pub enum MovieError {
    /// The tracker could not be reached or answered badly.
    #[error("Failed to retrieve movie data: {0}")]
    Retrieval(#[from] SessionError),

    /// Tracker data did not have the expected shape.
    #[error("Failed to parse movie data: {0}")]
    Parse(String),

    /// Field is neither stored nor routed to any source.
    #[error("Unknown movie field: {0}")]
    UnknownField(String),

    /// Source was loaded but did not provide the field.
    #[error("Field '{field}' missing after loading {category} data")]
    MissingField { field: String, category: Source },
}

/// A movie on the tracker.
pub struct Movie {
    id: String,
    data: BTreeMap<String, MovieValue>,
    loaded: HashSet<Source>,
    transport: Arc<dyn Transport>,
}

impl Movie {
    /// A movie known only by ID; nothing is loaded.
    pub fn new(id: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            id: id.into(),
            data: BTreeMap::new(),
            loaded: HashSet::new(),
            transport,
        }
    }

    /// A movie from an already fetched record (e.g. a search result).
    ///
    /// The ID comes from `GroupId`. A `Torrents` list in the record is
    /// normalized right away.
    pub fn from_data(
        data: Map<String, Value>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, MovieError> {
        let id = match data.get("GroupId") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                return Err(MovieError::MissingField {
                    field: "GroupId".to_string(),
                    category: Source::Json,
                })
            }
        };

        let mut movie = Self::new(id, transport);
        movie.data = data
            .into_iter()
            .map(|(k, v)| (k, MovieValue::Raw(v)))
            .collect();
        movie.normalize_torrents()?;
        Ok(movie)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether `source` has been loaded for this movie.
    pub fn is_loaded(&self, source: Source) -> bool {
        self.loaded.contains(&source)
    }

    /// Read a field, loading its source first if it is not resolved yet.
    pub async fn get(&mut self, name: &str) -> Result<&MovieValue, MovieError> {
        if !self.is_resolved(name) {
            match route_for(name) {
                Some(source) => self.ensure_loaded(source).await?,
                None if self.data.contains_key(name) => {}
                None => return Err(MovieError::UnknownField(name.to_string())),
            }
        }

        match (self.data.get(name), route_for(name)) {
            (Some(value), _) => Ok(value),
            (None, Some(category)) => Err(MovieError::MissingField {
                field: name.to_string(),
                category,
            }),
            (None, None) => Err(MovieError::UnknownField(name.to_string())),
        }
    }

    /// Overwrite a field unconditionally.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<MovieValue>) {
        self.data.insert(name.into(), value.into());
    }

    /// Fields resolved so far.
    pub fn items(&self) -> impl Iterator<Item = (&str, &MovieValue)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Torrents of this movie, loading the JSON source if needed.
    pub async fn torrents(&mut self) -> Result<&[Torrent], MovieError> {
        self.ensure_torrents().await?;
        self.torrent_list().ok_or_else(|| MovieError::MissingField {
            field: "Torrents".to_string(),
            category: Source::Json,
        })
    }

    /// Pick the torrent best matching a comma separated fallback chain of
    /// profiles. `Ok(None)` means no profile matched anything.
    pub async fn best_match(&mut self, profile: &str) -> Result<Option<&Torrent>, MovieError> {
        let id = self.id.clone();
        let torrents = self.torrents().await?;
        let found = matcher::best_match(torrents, profile);
        match found {
            Some(torrent) => debug!(movie = %id, torrent = %torrent, "Best match found"),
            None => info!(movie = %id, profile = profile, "Could not find best match"),
        }
        Ok(found)
    }

    fn is_resolved(&self, name: &str) -> bool {
        self.data.get(name).is_some_and(|v| !v.is_null())
    }

    fn torrent_list(&self) -> Option<&[Torrent]> {
        self.data.get("Torrents").and_then(MovieValue::as_torrents)
    }

    async fn ensure_loaded(&mut self, source: Source) -> Result<(), MovieError> {
        match source {
            Source::Json => self.ensure_json().await,
            Source::Html => {
                if !self.is_loaded(Source::Html) {
                    self.load_html().await?;
                    self.loaded.insert(Source::Html);
                }
                Ok(())
            }
            Source::Inferred => {
                if !self.is_loaded(Source::Inferred) {
                    self.load_inferred();
                    self.loaded.insert(Source::Inferred);
                }
                Ok(())
            }
        }
    }

    async fn ensure_json(&mut self) -> Result<(), MovieError> {
        if !self.is_loaded(Source::Json) {
            self.load_json().await?;
            self.loaded.insert(Source::Json);
        }
        Ok(())
    }

    async fn ensure_torrents(&mut self) -> Result<(), MovieError> {
        if !self.is_resolved("Torrents") {
            self.ensure_json().await?;
        }
        self.normalize_torrents()
    }

    fn load_inferred(&mut self) {
        debug!(movie = %self.id, "Inferring movie fields");
        let link = format!(
            "{}/torrents.php?id={}",
            self.transport.base_url().trim_end_matches('/'),
            self.id
        );
        self.set("Id", self.id.clone());
        self.set("GroupId", self.id.clone());
        self.set("Link", link);
    }

    async fn load_json(&mut self) -> Result<(), MovieError> {
        debug!(movie = %self.id, "Loading movie JSON");
        let response = self
            .transport
            .get("torrents.php", &[("id", self.id.as_str()), ("json", "1")])
            .await?;

        for (key, value) in response.json()? {
            self.data.insert(key, MovieValue::Raw(value));
        }
        if !self.is_resolved("ImdbId") {
            self.set("ImdbId", "");
        }
        if !self.is_resolved("Directors") {
            self.set("Directors", json!([]));
        }

        self.normalize_torrents()
    }

    async fn load_html(&mut self) -> Result<(), MovieError> {
        // Enrichment targets existing torrents, so they must exist first.
        self.ensure_torrents().await?;
        let torrents = self.torrent_list().ok_or_else(|| MovieError::MissingField {
            field: "Torrents".to_string(),
            category: Source::Json,
        })?;
        let torrent_ids = torrents
            .iter()
            .map(|t| {
                t.id().ok_or_else(|| MovieError::MissingField {
                    field: "Torrents[].Id".to_string(),
                    category: Source::Json,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(movie = %self.id, torrents = torrent_ids.len(), "Scraping movie page");
        let response = self
            .transport
            .get("torrents.php", &[("id", self.id.as_str())])
            .await?;
        let page = scrape_page(&response.text, &torrent_ids)?;

        self.apply_page(page);
        Ok(())
    }

    fn apply_page(&mut self, mut page: ScrapedPage) {
        self.set("Cover", page.cover);
        self.set("Title", page.title);
        self.set("Year", page.year);
        self.set("Tags", json!(page.tags));
        let directors: Vec<Value> = page
            .directors
            .into_iter()
            .map(|name| json!({ "Name": name }))
            .collect();
        self.set("Directors", Value::Array(directors));

        if let Some(MovieValue::Torrents(torrents)) = self.data.get_mut("Torrents") {
            for torrent in torrents.iter_mut() {
                let enrichment = torrent.id().and_then(|id| page.torrents.remove(&id));
                if let Some(enrichment) = enrichment {
                    torrent.apply(enrichment);
                }
            }
        }
    }

    /// Convert raw `Torrents` records into [`Torrent`]s; no-op once converted.
    fn normalize_torrents(&mut self) -> Result<(), MovieError> {
        match self.data.get("Torrents") {
            Some(MovieValue::Raw(Value::Array(items))) => {
                if items.iter().any(|item| !item.is_object()) {
                    return Err(MovieError::Parse(
                        "Torrents contains a non-object entry".to_string(),
                    ));
                }
            }
            Some(MovieValue::Raw(Value::Null)) | Some(MovieValue::Torrents(_)) | None => {
                return Ok(())
            }
            Some(MovieValue::Raw(other)) => {
                return Err(MovieError::Parse(format!(
                    "Torrents must be a list, got {}",
                    other
                )))
            }
        }

        let Some(MovieValue::Raw(Value::Array(items))) = self.data.remove("Torrents") else {
            return Ok(());
        };
        let torrents: Vec<Torrent> = items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(mut map) => {
                    let title = map
                        .entry("RemasterTitle")
                        .or_insert_with(|| Value::String(String::new()));
                    if title.is_null() {
                        *title = Value::String(String::new());
                    }
                    Some(Torrent::from_raw(map))
                }
                _ => None,
            })
            .collect();

        debug!(movie = %self.id, count = torrents.len(), "Normalized torrents");
        self.data
            .insert("Torrents".to_string(), MovieValue::Torrents(torrents));
        Ok(())
    }
}

impl fmt::Debug for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Movie")
            .field("id", &self.id)
            .field("data", &self.data)
            .field("loaded", &self.loaded)
            .finish()
    }
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Movie ID {}>", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockTransport};

    fn movie_with(transport: MockTransport) -> (Movie, Arc<MockTransport>) {
        let transport = Arc::new(transport);
        (Movie::new("42", transport.clone()), transport)
    }

    #[test]
    fn test_inferred_fields_need_no_network() {
        let (mut movie, transport) = movie_with(MockTransport::new());

        tokio_test::block_on(async {
            assert_eq!(movie.get("Id").await.unwrap().as_str(), Some("42"));
            assert_eq!(movie.get("GroupId").await.unwrap().as_str(), Some("42"));
            assert_eq!(
                movie.get("Link").await.unwrap().as_str(),
                Some("https://tracker.test/torrents.php?id=42")
            );
        });

        assert!(transport.requests().is_empty());
        assert!(movie.is_loaded(Source::Inferred));
        assert!(!movie.is_loaded(Source::Json));
    }

    #[test]
    fn test_unknown_field() {
        let (mut movie, transport) = movie_with(MockTransport::new());
        let err = tokio_test::block_on(movie.get("Bitrate")).unwrap_err();
        assert!(matches!(err, MovieError::UnknownField(ref f) if f == "Bitrate"));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_set_field_is_returned_without_loading() {
        let (mut movie, transport) = movie_with(MockTransport::new());
        movie.set("Bitrate", "high");
        movie.set("ImdbId", "tt0000001");

        tokio_test::block_on(async {
            assert_eq!(movie.get("Bitrate").await.unwrap().as_str(), Some("high"));
            assert_eq!(movie.get("ImdbId").await.unwrap().as_str(), Some("tt0000001"));
        });
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_json_defaults_applied() {
        let (mut movie, _) =
            movie_with(MockTransport::new().with_json(fixtures::movie_json("42", vec![])));

        tokio_test::block_on(async {
            assert_eq!(movie.get("ImdbId").await.unwrap().as_str(), Some(""));
        });
        assert_eq!(
            movie.items().find(|(k, _)| *k == "Directors").map(|(_, v)| v.to_json()),
            Some(json!([]))
        );
    }

    #[test]
    fn test_missing_field_after_load() {
        let mut body = fixtures::movie_json("42", vec![]);
        body.as_object_mut().unwrap().remove("ImdbRating");
        let (mut movie, transport) = movie_with(MockTransport::new().with_json(body));

        let err = tokio_test::block_on(movie.get("ImdbRating")).unwrap_err();
        assert!(matches!(
            err,
            MovieError::MissingField { ref field, category: Source::Json } if field == "ImdbRating"
        ));
        assert_eq!(transport.json_requests(), 1);
    }

    #[test]
    fn test_from_data_requires_group_id() {
        let err = Movie::from_data(Map::new(), Arc::new(MockTransport::new())).unwrap_err();
        assert!(matches!(err, MovieError::MissingField { ref field, .. } if field == "GroupId"));
    }

    #[test]
    fn test_from_data_numeric_group_id() {
        let data = match json!({"GroupId": 1234}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let movie = Movie::from_data(data, Arc::new(MockTransport::new())).unwrap();
        assert_eq!(movie.id(), "1234");
        assert_eq!(movie.to_string(), "<Movie ID 1234>");
    }

    #[test]
    fn test_normalize_rejects_non_list() {
        let data = match json!({"GroupId": "1", "Torrents": "nope"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let err = Movie::from_data(data, Arc::new(MockTransport::new())).unwrap_err();
        assert!(matches!(err, MovieError::Parse(_)));
    }

    #[test]
    fn test_normalize_defaults_remaster_title() {
        let data = match json!({
            "GroupId": "1",
            "Torrents": [{"Id": "5"}, {"Id": "6", "RemasterTitle": null}]
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let movie = Movie::from_data(data, Arc::new(MockTransport::new())).unwrap();
        let torrents = movie.torrent_list().unwrap();
        assert_eq!(torrents[0].get("RemasterTitle"), Some(&json!("")));
        assert_eq!(torrents[1].get("RemasterTitle"), Some(&json!("")));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let (mut movie, _) = movie_with(MockTransport::new());
        movie.set("Torrents", json!([{"Id": "5", "Seeders": "3"}]));
        movie.normalize_torrents().unwrap();
        let first = movie.torrent_list().unwrap().to_vec();
        movie.normalize_torrents().unwrap();
        assert_eq!(movie.torrent_list().unwrap(), first.as_slice());
    }
}
