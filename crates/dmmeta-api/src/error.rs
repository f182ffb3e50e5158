use thiserror::Error;

/// Errors from the DMM provider.
#[derive(Debug, Error)]
pub enum DmmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("invalid DMM link: {0}")]
    InvalidLink(String),

    #[error("movie not found: {0}")]
    NotFound(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("config error: {0}")]
    Config(String),
}
