pub mod config;
pub mod error;
pub mod models;

pub use config::AppConfig;
pub use error::CoreError;
pub use models::{MetadataRecord, SearchResultSummary};
