use std::path::PathBuf;
use thiserror::Error;

/// A page fetch that did not produce a body. Ends pagination for the
/// current (city, type) pair only.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} timed out: {cause}")]
    Timeout { url: String, cause: String },

    #[error("could not connect to {url}: {cause}")]
    Connect { url: String, cause: String },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read response body from {url}: {cause}")]
    Body { url: String, cause: String },

    #[error("request to {url} failed: {cause}")]
    Other { url: String, cause: String },
}

impl TransportError {
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        let url = url.to_string();
        let cause = err.to_string();
        if err.is_timeout() {
            TransportError::Timeout { url, cause }
        } else if err.is_connect() {
            TransportError::Connect { url, cause }
        } else if let Some(status) = err.status() {
            TransportError::Status {
                url,
                status: status.as_u16(),
            }
        } else if err.is_body() || err.is_decode() {
            TransportError::Body { url, cause }
        } else {
            TransportError::Other { url, cause }
        }
    }
}

/// The final table could not be written. Fatal for the run.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode row for {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{0}")]
    Invalid(String),
}
