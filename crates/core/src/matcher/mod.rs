//! Profile-based best match selection.
//!
//! A profile string is a comma separated fallback chain. Each profile
//! narrows the torrent list with every filter it mentions; a single
//! survivor wins outright, several survivors are ranked by the profile's
//! sort, and no survivors moves on to the next profile. A profile that
//! names no sort uses the one named elsewhere in the chain, then falls
//! back to most recent.

mod profile;

pub use profile::{sort_key_in, Predicate, Profile, SortKey, FILTERS, SORTS};

use tracing::debug;

use crate::torrent::Torrent;

/// Best torrent for the fallback chain `profiles`, or `None` if every
/// profile filtered everything out.
pub fn best_match<'a>(torrents: &'a [Torrent], profiles: &str) -> Option<&'a Torrent> {
    let chain_sort = sort_key_in(profiles);

    for profile in Profile::parse_chain(profiles) {
        debug!(profile = %profile, "Attempting to match profile");

        let mut matches: Vec<&Torrent> = torrents.iter().collect();
        for (key, predicate) in profile.filters() {
            matches.retain(|&t| predicate(t));
            debug!(
                filter = key,
                remaining = matches.len(),
                "Filtered candidates"
            );
        }

        match matches.len() {
            0 => continue,
            1 => return matches.pop(),
            _ => {
                let sort = profile
                    .sort_key()
                    .or(chain_sort)
                    .unwrap_or(SortKey::MostRecent);
                debug!(sort = ?sort, candidates = matches.len(), "Sorting candidates");
                sort.sort(&mut matches);
                return matches.first().copied();
            }
        }
    }

    None
}
