use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OdFetchError {
    #[error("Configuration error: {details}")]
    Config { details: String },

    #[error("Failed to load configuration file: {0}")]
    ConfigFile(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write {path}: {reason}")]
    FileWrite { path: PathBuf, reason: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{url} returned a {status} status: {body}")]
    HttpStatus {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("Unexpected document structure: {details}")]
    Structure { details: String },

    #[error("Malformed data: {details}")]
    Format { details: String },

    #[error("Failed to parse embedded JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to decode media descriptor: {0}")]
    Xml(#[from] quick_xml::de::DeError),

    #[error("{url} returned no content")]
    Transient { url: String },

    #[error("Downloading part {index} ({name}) failed: {source}")]
    PartDownload {
        index: usize,
        name: String,
        #[source]
        source: Box<OdFetchError>,
    },

    #[error("{} part(s) could not be downloaded after retrying: {failed:?}", .failed.len())]
    RetriesExhausted { failed: Vec<usize> },

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] eyre::Report),
}

impl OdFetchError {
    /// Only an empty part response is worth asking for again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    pub(crate) fn structure(details: impl Into<String>) -> Self {
        Self::Structure {
            details: details.into(),
        }
    }

    pub(crate) fn format(details: impl Into<String>) -> Self {
        Self::Format {
            details: details.into(),
        }
    }

    pub(crate) fn config(details: impl Into<String>) -> Self {
        Self::Config {
            details: details.into(),
        }
    }
}
