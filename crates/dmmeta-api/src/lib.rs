//! Metadata lookups against the DMM catalog.
//!
//! [`DmmClient`] probes the catalog sections for an id, scrapes the detail
//! page and follows the sample-movie player pages to a playable preview URL.

pub mod dmm;
pub mod error;
pub mod fetch;
pub mod traits;

#[cfg(test)]
mod testing;

pub use dmm::DmmClient;
pub use error::DmmError;
pub use fetch::{FetchedPage, HttpFetcher, PageFetcher};
pub use traits::MovieProvider;
