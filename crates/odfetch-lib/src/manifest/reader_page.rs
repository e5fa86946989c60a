//! Manifest embedded as JSON inside the web reader's HTML page.

use super::html_path::{HtmlSelector, find_element};
use super::types::{DownloadManifest, ManifestEntry};
use crate::constants::reader::{METADATA_FILE_NAME, USER_AGENT};
use crate::error::OdFetchError;
use crate::http::{header_value, require_ok};
use regex::Regex;
use reqwest::header::{HeaderMap, REFERER, USER_AGENT as USER_AGENT_HEADER};
use reqwest::{Client, Url};
use scraper::Html;
use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;

const READER_DATA_PATH: [HtmlSelector; 4] = [
    HtmlSelector::tag("html"),
    HtmlSelector::tag("body"),
    HtmlSelector::tag_with_id("div", "BIFOCAL-runtime"),
    HtmlSelector::tag_with_id("script", "BIFOCAL-data"),
];

fn re_book_data() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"window\.bData = (?P<data>\{.*\})").unwrap())
}

#[derive(Debug, Deserialize)]
struct BookData {
    spine: Vec<SpineItem>,
}

#[derive(Debug, Deserialize)]
struct SpineItem {
    path: String,
    #[serde(rename = "-odread-original-path")]
    original_path: String,
}

/// Fetches the reader page, stores the embedded book data as `metadata.json` and builds a
/// manifest with one entry per spine item.
pub async fn resolve_reader_page(
    client: &Client,
    url: &Url,
    output_dir: &Path,
) -> Result<DownloadManifest, OdFetchError> {
    tracing::info!(%url, "Fetching reader page");
    let response = client
        .get(url.clone())
        .header(USER_AGENT_HEADER, USER_AGENT)
        .send()
        .await?;
    let response = require_ok(response).await?;

    // Part URLs are relative to wherever the redirects ended up.
    let page_url = response.url().clone();
    if page_url != *url {
        tracing::debug!(%page_url, "Reader page was redirected");
    }
    let body = response.text().await?;

    let data = extract_book_data(&body)?;

    let metadata_path = output_dir.join(METADATA_FILE_NAME);
    tokio::fs::write(&metadata_path, data.as_bytes())
        .await
        .map_err(|e| OdFetchError::FileWrite {
            path: metadata_path.clone(),
            reason: e.to_string(),
        })?;
    tracing::debug!(path = %metadata_path.display(), "Saved book metadata");

    let book: BookData = serde_json::from_str(&data)?;
    let manifest = build_manifest(&page_url, book)?;
    tracing::info!(parts = manifest.len(), "Resolved reader manifest");
    Ok(manifest)
}

/// Returns the JSON object assigned to `window.bData` in the reader's data script.
fn extract_book_data(page: &str) -> Result<String, OdFetchError> {
    let document = Html::parse_document(page);
    let element = find_element(&document, &READER_DATA_PATH)?;

    let text: String = element.text().collect();
    if text.is_empty() {
        return Err(OdFetchError::format("reader data script is empty"));
    }
    let text = html_escape::decode_html_entities(&text);

    re_book_data()
        .captures(&text)
        .and_then(|captures| captures.name("data"))
        .map(|data| data.as_str().to_string())
        .ok_or_else(|| OdFetchError::format("reader data script does not assign window.bData"))
}

fn build_manifest(page_url: &Url, book: BookData) -> Result<DownloadManifest, OdFetchError> {
    let host = page_url
        .host_str()
        .ok_or_else(|| OdFetchError::format(format!("reader URL {page_url} has no host")))?;
    let origin = match page_url.port() {
        Some(port) => format!("{}://{}:{}", page_url.scheme(), host, port),
        None => format!("{}://{}", page_url.scheme(), host),
    };

    let mut headers = HeaderMap::new();
    headers.insert(REFERER, header_value("reader URL", page_url.as_str().as_bytes())?);
    headers.insert(USER_AGENT_HEADER, header_value("user agent", USER_AGENT.as_bytes())?);

    let entries = book
        .spine
        .into_iter()
        .map(|item| {
            let location = format!("{}/{}", origin, item.path.trim_start_matches('/'));
            let source = Url::parse(&location).map_err(|e| {
                OdFetchError::format(format!("invalid part location {location}: {e}"))
            })?;
            Ok(ManifestEntry {
                name: item.original_path,
                source,
                headers: headers.clone(),
            })
        })
        .collect::<Result<Vec<_>, OdFetchError>>()?;

    DownloadManifest::new(entries)
}
