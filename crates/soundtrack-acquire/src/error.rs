use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("malformed URL '{url}': {reason}")]
    Parse { url: String, reason: String },

    #[error("song '{0}' has no page link")]
    MissingLink(String),

    #[error("no download link found for '{0}'")]
    NoLinkFound(String),

    #[error("failed to save {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
