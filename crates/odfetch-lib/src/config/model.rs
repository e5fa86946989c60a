use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub download: DownloadConfig,
}

/// Fallbacks for the download flags. Durations are human-readable (`2s`, `500ms`).
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DownloadConfig {
    pub output_dir: Option<PathBuf>,
    pub rate_interval: Option<String>,
    pub retry_count: Option<usize>,
    pub request_timeout: Option<String>,
    pub strict: Option<bool>,
}
