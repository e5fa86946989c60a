use crate::download::DownloadOptions;
use crate::manifest::ManifestSource;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FetchParams {
    pub source: ManifestSource,
    pub output_dir: PathBuf,
    pub options: DownloadOptions,
    pub request_timeout: Duration,
    /// Treat parts that ran out of retries as a failed run.
    pub strict: bool,
}
