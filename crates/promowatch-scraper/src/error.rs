use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("timed out after {timeout_secs}s fetching {url}")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("could not parse markup from {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("invalid page URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ScraperError {
    /// The page could not be retrieved (network failure, timeout, bad status
    /// or an unusable URL).
    #[must_use]
    pub fn is_fetch(&self) -> bool {
        !self.is_parse()
    }

    /// The page was retrieved but its markup could not be turned into a tree.
    #[must_use]
    pub fn is_parse(&self) -> bool {
        matches!(self, ScraperError::Parse { .. })
    }
}
