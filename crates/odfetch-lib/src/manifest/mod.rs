mod hash;
mod html_path;
mod media_descriptor;
mod reader_page;
mod types;

pub use hash::{license_hash, media_console_hash};
pub use html_path::{HtmlSelector, find_element};
pub use media_descriptor::resolve_media_descriptor;
pub use reader_page::resolve_reader_page;
pub use types::{DownloadManifest, ManifestEntry};

use crate::error::OdFetchError;
use reqwest::{Client, Url};
use std::path::{Path, PathBuf};

/// Where the list of parts comes from.
#[derive(Clone, Debug)]
pub enum ManifestSource {
    /// A web reader page with the book data embedded in it.
    ReaderPage(Url),
    /// A local `.odm` media descriptor that points at a license endpoint.
    MediaDescriptor(PathBuf),
}

pub async fn resolve(
    client: &Client,
    source: &ManifestSource,
    output_dir: &Path,
) -> Result<DownloadManifest, OdFetchError> {
    match source {
        ManifestSource::ReaderPage(url) => resolve_reader_page(client, url, output_dir).await,
        ManifestSource::MediaDescriptor(path) => {
            resolve_media_descriptor(client, path, output_dir).await
        }
    }
}
