//! Records produced by a metadata lookup.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Resolved metadata for one catalog item.
///
/// String fields use the empty string for "unknown".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Page the record was extracted from.
    pub homepage: String,
    /// Raw catalog code (`cid`).
    pub id: String,
    /// Canonical `LETTERS-NNN` number, empty if unparsable.
    pub number: String,
    pub title: String,
    pub summary: String,
    pub series: String,
    pub maker: String,
    pub publisher: String,
    pub director: String,
    pub release_date: Option<NaiveDate>,
    pub duration_minutes: Option<u32>,
    /// Average user rating, 0–5 on this site.
    pub score: Option<f64>,
    pub thumb_url: String,
    pub cover_url: String,
    pub preview_video_url: String,
    pub actors: Vec<String>,
    pub tags: Vec<String>,
    pub preview_images: Vec<String>,
}

impl MetadataRecord {
    /// A fresh record with the fields known before extraction.
    pub fn new(homepage: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            homepage: homepage.into(),
            id: id.into(),
            ..Default::default()
        }
    }

    /// A record is usable once it has an id and either a title or a number.
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty() && (!self.title.is_empty() || !self.number.is_empty())
    }

    /// Replace the actor list, dropping blanks and duplicates.
    pub fn set_actors<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actors = ordered_set(names);
    }

    /// Replace the tag list, dropping blanks and duplicates.
    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = ordered_set(tags);
    }
}

/// Collect trimmed, non-empty values keeping the first occurrence of each.
fn ordered_set<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out: Vec<String> = Vec::new();
    for value in values {
        let owned: String = value.into();
        let value = owned.trim();
        if !value.is_empty() && !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}

/// One entry of a search listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultSummary {
    pub id: String,
    pub number: String,
    pub title: String,
    pub homepage: String,
    pub thumb_url: String,
    pub cover_url: String,
    pub score: Option<f64>,
}
