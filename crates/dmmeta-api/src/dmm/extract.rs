//! Detail page field extraction.
//!
//! The page exposes the same facts in several places: the header, a label
//! table, a performer block, a JSON-LD block and meta tags. Extraction runs
//! an ordered list of passes over one parsed document; each pass documents
//! which fields it may overwrite and when.

use std::sync::LazyLock;

use dmmeta_core::MetadataRecord;
use dmmeta_parse::{maximize, normalize, parse_date, parse_duration, parse_score, parse_score_from_url};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::absolute_url;
use super::labels::{field_for, RowField};
use super::types::LdDocument;

static SEL_TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#title").unwrap());
static SEL_ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static SEL_ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static SEL_IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static SEL_P: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static SEL_PERFORMER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#performer a").unwrap());
static SEL_LD_JSON: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());
static SEL_SUMMARY_BLOCK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"div[class="mg-b20 lh4"]"#).unwrap());
static SEL_OG_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:description"]"#).unwrap());
static SEL_GALLERY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#sample-image-block > a").unwrap());

/// A parsed detail page.
pub struct Page<'a> {
    pub doc: &'a Html,
    /// Final page URL, base for relative links.
    pub url: &'a Url,
    /// Lower-cased content id from the link; scopes the image selectors.
    pub cid: &'a str,
}

/// One step of the cascade.
pub struct ExtractionPass {
    pub name: &'static str,
    pub apply: fn(&Page<'_>, &mut MetadataRecord),
}

/// Passes in application order.
pub static PASSES: &[ExtractionPass] = &[
    ExtractionPass { name: "title", apply: title },
    ExtractionPass { name: "thumb", apply: thumb },
    ExtractionPass { name: "cover", apply: cover },
    ExtractionPass { name: "table", apply: table },
    ExtractionPass { name: "performers", apply: performers },
    ExtractionPass { name: "structured-data", apply: structured_data },
    ExtractionPass { name: "summary-fallback", apply: summary_fallback },
    ExtractionPass { name: "gallery", apply: gallery },
    ExtractionPass { name: "cover-default", apply: cover_default },
];

/// Run every pass over `page`. `record` must already carry `id` and `homepage`.
pub fn extract(page: &Page<'_>, record: &mut MetadataRecord) {
    for pass in PASSES {
        (pass.apply)(page, record);
        tracing::trace!(pass = pass.name, "Applied extraction pass");
    }
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Strip the dash padding used for empty cells ("----").
fn strip_dashes(s: &str) -> String {
    s.trim().trim_matches('-').trim().to_string()
}

/// Selector for an element with exactly this id. Content ids may start with
/// a digit, which `#id` syntax does not allow.
fn id_selector(id: &str) -> Option<Selector> {
    let escaped = id.replace('\\', "\\\\").replace('"', "\\\"");
    Selector::parse(&format!(r#"[id="{escaped}"]"#)).ok()
}

// ── Passes ───────────────────────────────────────────────────────

fn title(page: &Page<'_>, record: &mut MetadataRecord) {
    if let Some(el) = page.doc.select(&SEL_TITLE).next() {
        record.title = text_of(el);
    }
}

fn thumb(page: &Page<'_>, record: &mut MetadataRecord) {
    let Some(sel) = id_selector(&format!("package-src-{}", page.cid)) else {
        return;
    };
    if let Some(src) = page
        .doc
        .select(&sel)
        .find_map(|el| el.value().attr("src"))
        .filter(|s| !s.trim().is_empty())
    {
        record.thumb_url = absolute_url(page.url, src);
    }
}

fn cover(page: &Page<'_>, record: &mut MetadataRecord) {
    let Some(sel) = id_selector(page.cid) else {
        return;
    };
    if let Some(href) = page
        .doc
        .select(&sel)
        .find_map(|el| el.value().attr("href"))
        .filter(|s| !s.trim().is_empty())
    {
        record.cover_url = absolute_url(page.url, &maximize(href));
    }
}

/// Label/value rows. Unknown labels are ignored.
fn table(page: &Page<'_>, record: &mut MetadataRecord) {
    for row in page.doc.select(&SEL_ROW) {
        let mut cells = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "td");
        let Some(label) = cells.next() else {
            continue;
        };
        let Some(field) = field_for(&text_of(label)) else {
            continue;
        };
        let Some(value) = cells.next() else {
            continue;
        };
        apply_row(field, value, page, record);
    }
}

fn apply_row(field: RowField, value: ElementRef<'_>, page: &Page<'_>, record: &mut MetadataRecord) {
    let text = text_of(value);
    match field {
        RowField::Id => {
            if !text.is_empty() {
                record.number = normalize(&text);
                record.id = text;
            }
        }
        RowField::Series => record.series = strip_dashes(&text),
        RowField::Maker => record.maker = strip_dashes(&text),
        RowField::Publisher => record.publisher = strip_dashes(&text),
        RowField::Director => record.director = strip_dashes(&text),
        RowField::Tags => record.set_tags(value.select(&SEL_ANCHOR).map(text_of)),
        RowField::Actors => record.set_actors([strip_dashes(&text)]),
        RowField::Score => {
            if let Some(score) = value
                .select(&SEL_IMG)
                .find_map(|img| img.value().attr("src"))
                .map(|src| absolute_url(page.url, src))
                .and_then(|src| parse_score_from_url(&src))
            {
                record.score = Some(score);
            }
        }
        RowField::Duration => {
            if let Some(minutes) = parse_duration(&text) {
                record.duration_minutes = Some(minutes);
            }
        }
        RowField::ReleaseDate => {
            if let Some(date) = parse_date(&text) {
                record.release_date = Some(date);
            }
        }
    }
}

/// The performer block lists every actor, the table row only the first few.
fn performers(page: &Page<'_>, record: &mut MetadataRecord) {
    let names: Vec<String> = page
        .doc
        .select(&SEL_PERFORMER)
        // "show all" toggles are in-page anchors, not performers.
        .filter(|a| {
            a.value()
                .attr("href")
                .map_or(true, |href| !href.starts_with('#') && !href.starts_with("javascript:"))
        })
        .map(text_of)
        .filter(|name| !name.is_empty())
        .collect();
    if !names.is_empty() {
        record.set_actors(names);
    }
}

/// JSON-LD overrides table values. Identity fields are seeded from the
/// record first; list, score and video fields only replace on non-empty.
fn structured_data(page: &Page<'_>, record: &mut MetadataRecord) {
    for script in page.doc.select(&SEL_LD_JSON) {
        let raw = script.text().collect::<String>();
        let product = match serde_json::from_str::<LdDocument>(raw.trim()) {
            Ok(doc) => doc.into_first(),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unparsable structured data");
                continue;
            }
        };
        let Some(product) = product else {
            continue;
        };

        // Identity only comes from a block that names its own sku.
        let seeded = product.seeded(record);
        if product.sku.as_deref().is_some_and(|sku| !sku.trim().is_empty()) {
            record.number = normalize(&seeded.sku);
            record.id = seeded.sku;
        }
        record.title = seeded.name;
        record.summary = seeded.description;
        record.thumb_url = absolute_url(page.url, &seeded.image);

        if let Some(genre) = product.subject_of.genre.as_ref() {
            let tags = genre.as_strs();
            if tags.iter().any(|t| !t.trim().is_empty()) {
                record.set_tags(tags);
            }
        }
        if let Some(score) = product
            .rating_text()
            .and_then(|text| parse_score(&text))
            .filter(|score| *score > 0.0)
        {
            record.score = Some(score);
        }
        if let Some(url) = product
            .subject_of
            .content_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
        {
            record.preview_video_url = absolute_url(page.url, url);
        }
    }
}

/// Description paragraph, then its whole block, then the meta description.
fn summary_fallback(page: &Page<'_>, record: &mut MetadataRecord) {
    if !record.summary.is_empty() {
        return;
    }

    if let Some(block) = page.doc.select(&SEL_SUMMARY_BLOCK).next() {
        let paragraphs = block
            .select(&SEL_P)
            .map(text_of)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        if !paragraphs.is_empty() {
            record.summary = paragraphs;
            return;
        }

        let full = text_of(block);
        if !full.is_empty() {
            record.summary = full;
            return;
        }
    }

    if let Some(content) = page
        .doc
        .select(&SEL_OG_DESCRIPTION)
        .find_map(|meta| meta.value().attr("content"))
    {
        record.summary = content.trim().to_string();
    }
}

fn gallery(page: &Page<'_>, record: &mut MetadataRecord) {
    for anchor in page.doc.select(&SEL_GALLERY) {
        let Some(src) = anchor
            .select(&SEL_IMG)
            .next()
            .and_then(|img| img.value().attr("src"))
            .filter(|s| !s.trim().is_empty())
        else {
            continue;
        };
        record
            .preview_images
            .push(absolute_url(page.url, &maximize(src)));
    }
}

/// Runs last so the JSON-LD thumbnail is taken into account.
fn cover_default(_page: &Page<'_>, record: &mut MetadataRecord) {
    if record.cover_url.is_empty() {
        record.cover_url = maximize(&record.thumb_url);
    }
}
