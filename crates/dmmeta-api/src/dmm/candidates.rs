//! Detail page URL templates for each catalog section.

use url::Url;

/// A catalog section and the detail page path for a content id.
#[derive(Debug, Clone, Copy)]
pub struct CatalogSection {
    pub name: &'static str,
    /// Path relative to the site root; `{cid}` is replaced by the id.
    pub template: &'static str,
}

/// Sections in probing order, most common item type first. When an id exists
/// in several sections the earliest one wins.
pub static CATALOG_SECTIONS: &[CatalogSection] = &[
    CatalogSection {
        name: "digital-videoa",
        template: "digital/videoa/-/detail/=/cid={cid}/",
    },
    CatalogSection {
        name: "mono-dvd",
        template: "mono/dvd/-/detail/=/cid={cid}/",
    },
    CatalogSection {
        name: "digital-videoc",
        template: "digital/videoc/-/detail/=/cid={cid}/",
    },
    CatalogSection {
        name: "digital-anime",
        template: "digital/anime/-/detail/=/cid={cid}/",
    },
    CatalogSection {
        name: "mono-anime",
        template: "mono/anime/-/detail/=/cid={cid}/",
    },
    CatalogSection {
        name: "digital-nikkatsu",
        template: "digital/nikkatsu/-/detail/=/cid={cid}/",
    },
];

/// Candidate detail URLs for `id`, in probing order.
pub fn candidates(base: &Url, id: &str) -> Vec<Url> {
    let cid = id.trim().to_lowercase();
    if cid.is_empty() {
        return Vec::new();
    }

    CATALOG_SECTIONS
        .iter()
        .filter_map(|section| {
            let path = section.template.replace("{cid}", &cid);
            match base.join(&path) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::debug!(section = section.name, error = %e, "Skipping candidate");
                    None
                }
            }
        })
        .collect()
}
