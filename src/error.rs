use thiserror::Error;

/// Custom error types for the harvest pipeline
#[derive(Error, Debug)]
pub enum FreeSsError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
    #[error("Invalid source '{0}': expected \"<url> <selector>\"")]
    InvalidSource(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("No servers found")]
    NoServers,
}

pub type Result<T> = std::result::Result<T, FreeSsError>;
