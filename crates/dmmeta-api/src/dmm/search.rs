//! Search listing extraction.

use std::sync::LazyLock;

use dmmeta_core::SearchResultSummary;
use dmmeta_parse::{maximize, normalize, parse_score};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::absolute_url;
use crate::error::DmmError;

const SEARCH_PATH: &str = "digital/-/list/search/=/";

static SEL_ENTRY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#list > li").unwrap());
static SEL_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"p[class="tmb"] > a"#).unwrap());
static SEL_THUMB: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"p[class="tmb"] > a > span:first-of-type > img"#).unwrap()
});
static SEL_RATE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"p[class="rate"] > span > span"#).unwrap());

static RE_ENTRY_CID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/cid=(.+?)/").unwrap());
/// Listing thumbnails come in several sizes; normalize to the small package.
static RE_THUMB_SIZE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(p[a-z]\.)jpg").unwrap());

/// Listing URL for a keyword. The site matches lower-case keywords best.
pub fn search_url(base: &Url, keyword: &str) -> Result<Url, DmmError> {
    let mut url = base
        .join(SEARCH_PATH)
        .map_err(|e| DmmError::Config(format!("search url: {e}")))?;
    url.query_pairs_mut()
        .append_pair("searchstr", &keyword.trim().to_lowercase());
    Ok(url)
}

/// Parse every listing entry in document order.
///
/// An entry without a content id means the listing markup changed; the
/// whole page is rejected rather than returning partial results.
pub fn parse_listing(body: &str, page_url: &Url) -> Result<Vec<SearchResultSummary>, DmmError> {
    let doc = Html::parse_document(body);
    doc.select(&SEL_ENTRY)
        .map(|entry| parse_entry(entry, page_url))
        .collect()
}

fn parse_entry(entry: ElementRef<'_>, page_url: &Url) -> Result<SearchResultSummary, DmmError> {
    let href = entry
        .select(&SEL_LINK)
        .find_map(|a| a.value().attr("href"))
        .unwrap_or_default();
    let id = RE_ENTRY_CID
        .captures(href)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| DmmError::Parse(format!("listing entry without content id: {href:?}")))?;

    let img = entry.select(&SEL_THUMB).next();
    let title = img
        .and_then(|img| img.value().attr("alt"))
        .unwrap_or_default()
        .trim()
        .to_string();
    let thumb = img
        .and_then(|img| img.value().attr("src"))
        .map(|src| RE_THUMB_SIZE.replace_all(src, "ps.jpg").into_owned())
        .unwrap_or_default();
    let score = entry
        .select(&SEL_RATE)
        .next()
        .and_then(|el| parse_score(&el.text().collect::<String>()));

    Ok(SearchResultSummary {
        number: normalize(&id),
        id,
        title,
        homepage: absolute_url(page_url, href),
        cover_url: absolute_url(page_url, &maximize(&thumb)),
        thumb_url: absolute_url(page_url, &thumb),
        score,
    })
}
