//! DMM (dmm.co.jp) provider.

pub mod candidates;
pub mod client;
pub mod extract;
pub mod labels;
pub mod preview;
pub mod search;
pub mod types;

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

pub use client::DmmClient;

use crate::error::DmmError;

/// `cid` path segment of a detail link.
static RE_LINK_CID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/cid=(.*?)/").unwrap());

/// Extract the lower-cased content id from a detail link.
pub fn cid_from_link(link: &str) -> Result<String, DmmError> {
    RE_LINK_CID
        .captures(link)
        .map(|caps| caps[1].to_lowercase())
        .filter(|cid| !cid.is_empty())
        .ok_or_else(|| DmmError::InvalidLink(link.to_string()))
}

/// Resolve `href` against `base`. Blank input stays blank.
pub(crate) fn absolute_url(base: &Url, href: &str) -> String {
    let href = href.trim();
    if href.is_empty() {
        return String::new();
    }
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}
