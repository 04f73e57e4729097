use thiserror::Error;

/// Per-node failure classes. None of these abort a crawl: a failed node is
/// reported to the caller, siblings proceed.
#[derive(Error, Debug)]
pub enum WalkError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("not an HTML document: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, WalkError>;
