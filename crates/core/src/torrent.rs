//! A single distributable variant of a movie.
//!
//! The tracker owns the torrent schema, so a [`Torrent`] keeps the raw
//! record as an opaque field map and only offers typed views over the
//! handful of fields the match engine needs.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Timestamp layout used by the tracker's `UploadTime` field.
pub const UPLOAD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Per-torrent data scraped from the movie page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentEnrichment {
    /// Relative file path -> size in bytes.
    pub filelist: BTreeMap<String, u64>,
    /// Reasons this torrent can be trumped (empty when it can't).
    pub trumpable: Vec<String>,
}

/// A torrent record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Torrent {
    data: Map<String, Value>,
}

impl Torrent {
    /// Build a torrent from a raw upstream record.
    pub fn from_raw(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// Torrent ID as a string; the tracker sends it as either a number or a string.
    pub fn id(&self) -> Option<String> {
        match self.data.get("Id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.data.insert(field.into(), value);
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn resolution(&self) -> Option<&str> {
        self.str_field("Resolution")
    }

    pub fn quality(&self) -> Option<&str> {
        self.str_field("Quality")
    }

    pub fn codec(&self) -> Option<&str> {
        self.str_field("Codec")
    }

    /// Remaster/edition title, empty when the torrent has none.
    pub fn remaster_title(&self) -> &str {
        self.str_field("RemasterTitle").unwrap_or("")
    }

    pub fn seeders(&self) -> Option<u64> {
        self.u64_field("Seeders")
    }

    /// Total size in bytes.
    pub fn size(&self) -> Option<u64> {
        self.u64_field("Size")
    }

    pub fn upload_time(&self) -> Option<NaiveDateTime> {
        let raw = self.str_field("UploadTime")?;
        NaiveDateTime::parse_from_str(raw, UPLOAD_TIME_FORMAT).ok()
    }

    pub fn golden_popcorn(&self) -> bool {
        self.bool_field("GoldenPopcorn")
    }

    pub fn scene(&self) -> bool {
        self.bool_field("Scene")
    }

    /// File listing, present once the movie page has been scraped.
    pub fn filelist(&self) -> Option<BTreeMap<String, u64>> {
        let files = self.data.get("Filelist")?.as_object()?;
        Some(
            files
                .iter()
                .filter_map(|(path, size)| size.as_u64().map(|s| (path.clone(), s)))
                .collect(),
        )
    }

    /// Trump reasons, present once the movie page has been scraped.
    pub fn trumpable(&self) -> Option<Vec<String>> {
        let reasons = self.data.get("Trumpable")?.as_array()?;
        Some(
            reasons
                .iter()
                .filter_map(|r| r.as_str().map(str::to_string))
                .collect(),
        )
    }

    /// Attach scraped page data as the `Filelist` and `Trumpable` fields.
    pub fn apply(&mut self, enrichment: TorrentEnrichment) {
        let files: Map<String, Value> = enrichment
            .filelist
            .into_iter()
            .map(|(path, size)| (path, Value::from(size)))
            .collect();
        self.data.insert("Filelist".to_string(), Value::Object(files));
        self.data.insert(
            "Trumpable".to_string(),
            Value::Array(enrichment.trumpable.into_iter().map(Value::String).collect()),
        );
    }

    fn str_field(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }

    fn u64_field(&self, field: &str) -> Option<u64> {
        match self.data.get(field)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn bool_field(&self, field: &str) -> bool {
        match self.data.get(field) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true") || s == "1",
            Some(Value::Number(n)) => n.as_u64().is_some_and(|n| n != 0),
            _ => false,
        }
    }
}

impl fmt::Display for Torrent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Torrent ID {}>", self.id().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn torrent(value: Value) -> Torrent {
        match value {
            Value::Object(map) => Torrent::from_raw(map),
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_typed_accessors_accept_tracker_strings() {
        let t = torrent(json!({
            "Id": 123,
            "Resolution": "1080p",
            "Quality": "High Definition",
            "Codec": "x264",
            "Seeders": "17",
            "Size": "4700000000",
            "UploadTime": "2019-03-04 05:06:07",
            "GoldenPopcorn": true,
            "Scene": false,
            "RemasterTitle": "Remux"
        }));

        assert_eq!(t.id().as_deref(), Some("123"));
        assert_eq!(t.resolution(), Some("1080p"));
        assert_eq!(t.quality(), Some("High Definition"));
        assert_eq!(t.codec(), Some("x264"));
        assert_eq!(t.seeders(), Some(17));
        assert_eq!(t.size(), Some(4_700_000_000));
        assert_eq!(
            t.upload_time().unwrap().to_string(),
            "2019-03-04 05:06:07"
        );
        assert!(t.golden_popcorn());
        assert!(!t.scene());
        assert_eq!(t.remaster_title(), "Remux");
    }

    #[test]
    fn test_missing_fields_read_as_absent() {
        let t = torrent(json!({"Id": "9"}));
        assert_eq!(t.seeders(), None);
        assert_eq!(t.size(), None);
        assert_eq!(t.upload_time(), None);
        assert!(!t.golden_popcorn());
        assert_eq!(t.remaster_title(), "");
        assert!(t.filelist().is_none());
        assert!(t.trumpable().is_none());
    }

    #[test]
    fn test_bad_upload_time_is_none() {
        let t = torrent(json!({"UploadTime": "yesterday"}));
        assert!(t.upload_time().is_none());
    }

    #[test]
    fn test_apply_enrichment() {
        let mut t = torrent(json!({"Id": "1"}));
        let mut filelist = BTreeMap::new();
        filelist.insert("Movie/movie.mkv".to_string(), 1_234_567);
        t.apply(TorrentEnrichment {
            filelist,
            trumpable: vec!["Hardcoded subtitles".to_string()],
        });

        assert_eq!(
            t.get("Filelist"),
            Some(&json!({"Movie/movie.mkv": 1_234_567}))
        );
        assert_eq!(t.filelist().unwrap().get("Movie/movie.mkv"), Some(&1_234_567));
        assert_eq!(t.trumpable().unwrap(), vec!["Hardcoded subtitles"]);
    }

    #[test]
    fn test_display() {
        let t = torrent(json!({"Id": 77}));
        assert_eq!(t.to_string(), "<Torrent ID 77>");
    }
}
