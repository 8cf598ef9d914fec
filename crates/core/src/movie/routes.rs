//! Field routing: which data source can supply which movie field.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A category of movie data, each fetched by its own load routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// The `torrents.php?json=1` endpoint.
    Json,
    /// The scraped `torrents.php` page.
    Html,
    /// Derived from the movie ID alone, no network access.
    Inferred,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Json => "json",
            Source::Html => "html",
            Source::Inferred => "inferred",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routing table consulted on every unresolved field access.
pub const FIELD_ROUTES: &[(&str, Source)] = &[
    ("ImdbId", Source::Json),
    ("ImdbRating", Source::Json),
    ("ImdbVoteCount", Source::Json),
    ("Torrents", Source::Json),
    ("CoverImage", Source::Json),
    ("Title", Source::Html),
    ("Year", Source::Html),
    ("Cover", Source::Html),
    ("Tags", Source::Html),
    ("Directors", Source::Html),
    ("Link", Source::Inferred),
    ("Id", Source::Inferred),
    ("GroupId", Source::Inferred),
];

/// Source responsible for `field`, if any.
pub fn route_for(field: &str) -> Option<Source> {
    FIELD_ROUTES
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, source)| *source)
}

/// Fields a source is responsible for, in table order.
pub fn fields_for(source: Source) -> impl Iterator<Item = &'static str> {
    FIELD_ROUTES
        .iter()
        .filter(move |(_, s)| *s == source)
        .map(|(name, _)| *name)
}
