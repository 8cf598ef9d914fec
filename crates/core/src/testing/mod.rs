//! Testing utilities and mock implementations.
//!
//! # Example
//!
//! ```rust,ignore
//! use popcorn_core::testing::{fixtures, MockTransport};
//!
//! let transport = MockTransport::new()
//!     .with_json(fixtures::movie_json("42", vec![fixtures::raw_torrent("1", "1080p", "x264", 4_000, 10)]))
//!     .with_html(fixtures::movie_page("Example Movie", "2019", &[], &[], &[]));
//! ```

mod mock_transport;

pub use mock_transport::{MockTransport, RecordedRequest};

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    /// Raw torrent record shaped like the tracker's JSON (numbers as strings).
    pub fn raw_torrent(id: &str, resolution: &str, codec: &str, size: u64, seeders: u64) -> Value {
        let quality = if matches!(resolution, "720p" | "1080p" | "2160p") {
            "High Definition"
        } else {
            "Standard Definition"
        };
        json!({
            "Id": id,
            "Quality": quality,
            "Source": "Blu-ray",
            "Container": "MKV",
            "Codec": codec,
            "Resolution": resolution,
            "Size": size.to_string(),
            "Seeders": seeders.to_string(),
            "Leechers": "0",
            "Snatched": "12",
            "UploadTime": "2020-01-01 00:00:00",
            "GoldenPopcorn": false,
            "Scene": false,
            "Checked": true,
            "ReleaseName": format!("Example.Movie.{}.{}", resolution, codec),
        })
    }

    /// JSON endpoint body for a movie.
    pub fn movie_json(group_id: &str, torrents: Vec<Value>) -> Value {
        json!({
            "Page": "Details",
            "Result": "OK",
            "GroupId": group_id,
            "Name": "Example Movie",
            "Year": "2019",
            "Cover": "https://img.example/cover.jpg",
            "Tags": ["drama"],
            "ImdbRating": "7.1",
            "ImdbVoteCount": 1234,
            "CoverImage": "https://img.example/cover.jpg",
            "Torrents": torrents,
        })
    }

    /// A torrent as it appears on the movie page.
    #[derive(Debug, Clone, Copy)]
    pub struct PageTorrent<'a> {
        pub id: &'a str,
        /// `None` for single-file torrents.
        pub base_dir: Option<&'a str>,
        pub files: &'a [(&'a str, u64)],
        pub trumpable: &'a [&'a str],
    }

    /// Movie page HTML in the tracker's layout.
    pub fn movie_page(
        title: &str,
        year: &str,
        directors: &[&str],
        tag_groups: &[&[&str]],
        torrents: &[PageTorrent],
    ) -> String {
        let directors_html: String = directors
            .iter()
            .map(|d| format!(r#" <a class="artist-info-link" href="artist.php?name={0}"> {0} </a>"#, d))
            .collect();

        let tags_html: String = tag_groups
            .iter()
            .map(|group| {
                let items: String = group
                    .iter()
                    .map(|t| format!(r#"<li><a href="torrents.php?taglist={0}">{0}</a></li>"#, t))
                    .collect();
                format!(r#"<div class="box_tags"><ul>{}</ul></div>"#, items)
            })
            .collect();

        let torrents_html: String = torrents.iter().map(torrent_block).collect();

        format!(
            r#"<!DOCTYPE html>
<html>
<head><title>{title} [{year}]</title></head>
<body>
<div class="sidebar"><img class="sidebar-cover-image" src="https://img.example/cover.jpg" alt="cover"></div>
<h2 class="page__title">{title} [{year}]{by}{directors_html}</h2>
{tags_html}
<table class="torrent_table">{torrents_html}</table>
</body>
</html>"#,
            by = if directors.is_empty() { "" } else { " by" },
        )
    }

    fn torrent_block(torrent: &PageTorrent) -> String {
        let base = torrent
            .base_dir
            .map(|d| format!("/{}/", d))
            .unwrap_or_default();
        let rows: String = torrent
            .files
            .iter()
            .map(|(name, size)| {
                format!(
                    r#"<tr><td>{}</td><td><span title="{} bytes">{}</span></td></tr>"#,
                    name,
                    thousands(*size),
                    size
                )
            })
            .collect();
        let trumpable = if torrent.trumpable.is_empty() {
            String::new()
        } else {
            let reasons: String = torrent
                .trumpable
                .iter()
                .map(|r| format!("<span>{}</span>", r))
                .collect();
            format!(r#"<div id="trumpable_{}">{}</div>"#, torrent.id, reasons)
        };

        format!(
            r#"<tr><td>
{trumpable}
<div id="files_{id}" class="hidden">
<table>
<thead><tr><th><div>File Names</div><div>{base}</div></th><th>Size</th></tr></thead>
<tbody>{rows}</tbody>
</table>
</div>
</td></tr>"#,
            id = torrent.id,
        )
    }

    fn thousands(n: u64) -> String {
        let digits = n.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(c);
        }
        out
    }

}
