//! Profile strings and the filter/sort tables they select from.
//!
//! A profile selects a filter or sort whenever the table key appears
//! anywhere in it, so `"unseeded"` also selects `seeded`. Keep it that way;
//! existing profiles rely on it.

use std::fmt;

use crate::torrent::Torrent;

/// Narrows the candidate set.
pub type Predicate = fn(&Torrent) -> bool;

/// Filters in application order.
pub const FILTERS: &[(&str, Predicate)] = &[
    ("gp", is_golden_popcorn),
    ("scene", is_scene),
    ("576p", is_576p),
    ("480p", is_480p),
    ("720p", is_720p),
    ("1080p", is_1080p),
    ("hd", is_high_definition),
    ("sd", is_standard_definition),
    ("remux", is_remux),
    ("x264", is_x264),
    ("seeded", is_seeded),
];

/// Sorts in lookup order; when several match, the last one wins.
pub const SORTS: &[(&str, SortKey)] = &[
    ("most recent", SortKey::MostRecent),
    ("smallest", SortKey::Smallest),
    ("seeders", SortKey::Seeders),
    ("largest", SortKey::Largest),
];

fn is_golden_popcorn(t: &Torrent) -> bool {
    t.golden_popcorn()
}

fn is_scene(t: &Torrent) -> bool {
    t.scene()
}

fn is_576p(t: &Torrent) -> bool {
    t.resolution() == Some("576p")
}

fn is_480p(t: &Torrent) -> bool {
    t.resolution() == Some("480p")
}

fn is_720p(t: &Torrent) -> bool {
    t.resolution() == Some("720p")
}

fn is_1080p(t: &Torrent) -> bool {
    t.resolution() == Some("1080p")
}

fn is_high_definition(t: &Torrent) -> bool {
    t.quality() == Some("High Definition")
}

fn is_standard_definition(t: &Torrent) -> bool {
    t.quality() == Some("Standard Definition")
}

fn is_remux(t: &Torrent) -> bool {
    t.remaster_title().to_lowercase().contains("remux")
}

fn is_x264(t: &Torrent) -> bool {
    t.codec() == Some("x264")
}

fn is_seeded(t: &Torrent) -> bool {
    t.seeders().unwrap_or(0) > 0
}

/// How to rank candidates when more than one survives filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Newest upload first; undated torrents last.
    MostRecent,
    /// Smallest size first; unknown sizes last.
    Smallest,
    /// Fewest seeders first; unknown counts last.
    Seeders,
    /// Largest size first; unknown sizes last.
    Largest,
}

impl SortKey {
    /// Stable sort, so ties keep tracker order.
    pub fn sort(&self, candidates: &mut [&Torrent]) {
        match self {
            SortKey::MostRecent => {
                candidates.sort_by(|a, b| b.upload_time().cmp(&a.upload_time()))
            }
            SortKey::Smallest => candidates.sort_by_key(|t| t.size().unwrap_or(u64::MAX)),
            SortKey::Seeders => candidates.sort_by_key(|t| t.seeders().unwrap_or(u64::MAX)),
            SortKey::Largest => candidates.sort_by(|a, b| b.size().cmp(&a.size())),
        }
    }
}

/// One entry of a comma separated fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    text: String,
}

impl Profile {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_lowercase(),
        }
    }

    /// Split a fallback chain such as `"gp,1080p,x264,smallest"`.
    pub fn parse_chain(chain: &str) -> Vec<Profile> {
        chain.to_lowercase().split(',').map(Profile::new).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Filters this profile selects, in table order.
    pub fn filters(&self) -> impl Iterator<Item = (&'static str, Predicate)> + '_ {
        FILTERS
            .iter()
            .filter(move |(key, _)| self.text.contains(key))
            .copied()
    }

    /// Sort this profile names, if any.
    pub fn sort_key(&self) -> Option<SortKey> {
        sort_key_in(&self.text)
    }
}

/// Last sort key (in table order) named anywhere in `text`.
pub fn sort_key_in(text: &str) -> Option<SortKey> {
    let text = text.to_lowercase();
    SORTS
        .iter()
        .filter(|(key, _)| text.contains(key))
        .last()
        .map(|(_, sort)| *sort)
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter_keys(profile: &str) -> Vec<&'static str> {
        Profile::new(profile).filters().map(|(key, _)| key).collect()
    }

    #[test]
    fn test_parse_chain_lowercases_and_keeps_order() {
        let chain = Profile::parse_chain("GP,1080p X264,Smallest");
        let texts: Vec<_> = chain.iter().map(Profile::as_str).collect();
        assert_eq!(texts, vec!["gp", "1080p x264", "smallest"]);
    }

    #[test]
    fn test_parse_chain_keeps_empty_segments() {
        let chain = Profile::parse_chain("720p,");
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[1].as_str(), "");
    }

    #[test]
    fn test_filters_follow_table_order() {
        assert_eq!(filter_keys("seeded x264 1080p"), vec!["1080p", "x264", "seeded"]);
    }

    #[test]
    fn test_filters_match_inside_words() {
        assert_eq!(filter_keys("hdr"), vec!["hd"]);
        assert_eq!(filter_keys("unseeded"), vec!["seeded"]);
    }

    #[test]
    fn test_filters_case_insensitive() {
        assert_eq!(filter_keys("HD"), vec!["hd"]);
    }

    #[test]
    fn test_sort_key_absent() {
        assert_eq!(Profile::new("1080p").sort_key(), None);
    }

    #[test]
    fn test_sort_key_last_in_table_wins() {
        assert_eq!(
            Profile::new("largest smallest").sort_key(),
            Some(SortKey::Largest)
        );
        assert_eq!(
            Profile::new("most recent seeders").sort_key(),
            Some(SortKey::Seeders)
        );
    }

    #[test]
    fn test_sort_key_in_whole_chain() {
        assert_eq!(sort_key_in("1080p,x264,Smallest"), Some(SortKey::Smallest));
        assert_eq!(sort_key_in("gp,seeded"), None);
    }
}
