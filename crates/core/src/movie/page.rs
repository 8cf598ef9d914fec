//! Movie page scraping.
//!
//! Turns the tracker's HTML movie page into a [`ScrapedPage`] record.
//! Nothing here touches a [`crate::Movie`]; the resolver merges the
//! record into its own fields and torrents afterwards.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex_lite::Regex;
use scraper::{ElementRef, Html, Selector};

use super::MovieError;
use crate::torrent::TorrentEnrichment;

static TITLE_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*) \[(\d{4})\]").expect("title pattern is valid"));

static BASE_DIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/(.*)/").expect("base directory pattern is valid"));

/// Everything the movie page contributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapedPage {
    pub cover: String,
    pub title: String,
    pub year: String,
    pub tags: Vec<String>,
    pub directors: Vec<String>,
    /// Keyed by torrent ID.
    pub torrents: HashMap<String, TorrentEnrichment>,
}

/// Split a `"<title> [<year>]"` heading.
pub fn parse_title_year(heading: &str) -> Result<(String, String), MovieError> {
    let caps = TITLE_YEAR.captures(heading.trim()).ok_or_else(|| {
        MovieError::Parse(format!(
            "heading '{}' does not match '<title> [<year>]'",
            heading.trim()
        ))
    })?;

    Ok((caps[1].to_string(), caps[2].to_string()))
}

/// Parse a size such as `"1,234,567 bytes"`.
pub fn parse_byte_size(raw: &str) -> Result<u64, MovieError> {
    let cleaned = raw.replace(',', "");
    let cleaned = cleaned.trim();
    let digits = cleaned.strip_suffix("bytes").unwrap_or(cleaned).trim();

    digits
        .parse()
        .map_err(|_| MovieError::Parse(format!("invalid byte size '{}'", raw)))
}

/// Scrape the movie page, enriching each of `torrent_ids`.
pub fn scrape_page(html: &str, torrent_ids: &[String]) -> Result<ScrapedPage, MovieError> {
    let doc = Html::parse_document(html);

    let cover = doc
        .select(&selector("img.sidebar-cover-image")?)
        .next()
        .and_then(|img| img.value().attr("src"))
        .ok_or_else(|| MovieError::Parse("cover image not found".to_string()))?
        .to_string();

    let heading = doc
        .select(&selector("h2.page__title")?)
        .next()
        .ok_or_else(|| MovieError::Parse("title heading not found".to_string()))?;
    let (title, year) = parse_title_year(&heading.inner_html())?;

    let item = selector("li")?;
    let anchor = selector("a")?;
    let mut tags = Vec::new();
    for tagbox in doc.select(&selector("div.box_tags")?) {
        for li in tagbox.select(&item) {
            if let Some(tag) = li.select(&anchor).next() {
                tags.push(element_text(tag));
            }
        }
    }

    let directors = heading
        .select(&selector("a.artist-info-link")?)
        .map(element_text)
        .collect();

    let mut torrents = HashMap::with_capacity(torrent_ids.len());
    for id in torrent_ids {
        let enrichment = TorrentEnrichment {
            filelist: scrape_filelist(&doc, id)?,
            trumpable: scrape_trumpable(&doc, id)?,
        };
        torrents.insert(id.clone(), enrichment);
    }

    Ok(ScrapedPage {
        cover,
        title,
        year,
        tags,
        directors,
        torrents,
    })
}

fn scrape_filelist(doc: &Html, torrent_id: &str) -> Result<BTreeMap<String, u64>, MovieError> {
    let filediv = doc
        .select(&selector(&format!("div#files_{}", torrent_id))?)
        .next()
        .ok_or_else(|| {
            MovieError::Parse(format!("file list for torrent {} not found", torrent_id))
        })?;

    // Single-file torrents have no base directory.
    let base_dir = match filediv.select(&selector("thead")?).next() {
        Some(head) => head
            .select(&selector("div")?)
            .nth(1)
            .map(element_text)
            .and_then(|text| BASE_DIR.captures(&text).map(|c| c[1].to_string()))
            .unwrap_or_default(),
        None => String::new(),
    };

    // The file div itself sits inside a table on the page, so only the
    // rows directly under its own tbody are file entries.
    let Some(body) = filediv.select(&selector("tbody")?).next() else {
        return Ok(BTreeMap::new());
    };

    let span = selector("span")?;
    let mut files = BTreeMap::new();
    for row in child_elements(body, "tr") {
        let cells: Vec<ElementRef> = child_elements(row, "td").collect();
        if cells.len() < 2 {
            return Err(MovieError::Parse(format!(
                "malformed file row for torrent {}",
                torrent_id
            )));
        }

        let name = element_text(cells[0]);
        let raw_size = cells[1]
            .select(&span)
            .next()
            .and_then(|s| s.value().attr("title"))
            .ok_or_else(|| {
                MovieError::Parse(format!("file size missing for torrent {}", torrent_id))
            })?;

        let path = if base_dir.is_empty() {
            name
        } else {
            format!("{}/{}", base_dir, name)
        };
        files.insert(path, parse_byte_size(raw_size)?);
    }

    Ok(files)
}

fn scrape_trumpable(doc: &Html, torrent_id: &str) -> Result<Vec<String>, MovieError> {
    let Some(block) = doc
        .select(&selector(&format!("#trumpable_{}", torrent_id))?)
        .next()
    else {
        return Ok(Vec::new());
    };

    Ok(block.select(&selector("span")?).map(element_text).collect())
}

fn selector(css: &str) -> Result<Selector, MovieError> {
    Selector::parse(css).map_err(|e| MovieError::Parse(format!("bad selector '{}': {:?}", css, e)))
}

fn child_elements<'a>(
    parent: ElementRef<'a>,
    tag: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |el| el.value().name() == tag)
}

fn element_text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}
