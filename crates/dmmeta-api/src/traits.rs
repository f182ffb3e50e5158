//! Provider interface exposed to callers.

use std::future::Future;

use dmmeta_core::{MetadataRecord, SearchResultSummary};

/// A catalog site that can resolve movie metadata.
pub trait MovieProvider: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Resolve an id by probing every known catalog section.
    fn get_movie_info_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<MetadataRecord, Self::Error>> + Send;

    /// Scrape a single detail page.
    fn get_movie_info_by_link(
        &self,
        link: &str,
    ) -> impl Future<Output = Result<MetadataRecord, Self::Error>> + Send;

    /// Search the catalog listing by keyword.
    fn search_movie(
        &self,
        keyword: &str,
    ) -> impl Future<Output = Result<Vec<SearchResultSummary>, Self::Error>> + Send;
}
