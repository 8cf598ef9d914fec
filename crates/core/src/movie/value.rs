use serde::Serialize;
use serde_json::Value;

use crate::torrent::Torrent;

/// A resolved movie field.
///
/// Everything the tracker sends stays as raw JSON except the torrent
/// list, which is normalized into [`Torrent`] entities once.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MovieValue {
    Raw(Value),
    Torrents(Vec<Torrent>),
}

impl MovieValue {
    /// Null counts as unresolved.
    pub fn is_null(&self) -> bool {
        matches!(self, MovieValue::Raw(Value::Null))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            MovieValue::Raw(v) => Some(v),
            MovieValue::Torrents(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    pub fn as_torrents(&self) -> Option<&[Torrent]> {
        match self {
            MovieValue::Torrents(t) => Some(t),
            MovieValue::Raw(_) => None,
        }
    }

    /// Plain JSON view of the value.
    pub fn to_json(&self) -> Value {
        match self {
            MovieValue::Raw(v) => v.clone(),
            MovieValue::Torrents(torrents) => Value::Array(
                torrents
                    .iter()
                    .map(|t| Value::Object(t.data().clone()))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for MovieValue {
    fn from(value: Value) -> Self {
        MovieValue::Raw(value)
    }
}

impl From<Vec<Torrent>> for MovieValue {
    fn from(torrents: Vec<Torrent>) -> Self {
        MovieValue::Torrents(torrents)
    }
}

impl From<&str> for MovieValue {
    fn from(s: &str) -> Self {
        MovieValue::Raw(Value::String(s.to_string()))
    }
}

impl From<String> for MovieValue {
    fn from(s: String) -> Self {
        MovieValue::Raw(Value::String(s))
    }
}
