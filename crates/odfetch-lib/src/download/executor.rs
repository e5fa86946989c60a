use super::types::DownloadAttempt;
use crate::error::OdFetchError;
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::path::Path;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Performs a single download attempt.
///
/// Implementations return [`OdFetchError::Transient`] for a response worth retrying and any
/// other error for conditions that should abort the run.
pub trait PartFetcher {
    fn fetch(
        &self,
        attempt: &DownloadAttempt<'_>,
        destination: &Path,
    ) -> impl Future<Output = Result<(), OdFetchError>> + Send;
}

/// Fetches parts over HTTP, streaming 200 responses straight to disk.
#[derive(Clone, Debug)]
pub struct HttpPartFetcher {
    client: Client,
}

impl HttpPartFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl PartFetcher for HttpPartFetcher {
    async fn fetch(
        &self,
        attempt: &DownloadAttempt<'_>,
        destination: &Path,
    ) -> Result<(), OdFetchError> {
        let entry = attempt.entry;
        let response = self
            .client
            .get(entry.source.clone())
            .headers(entry.headers.clone())
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NO_CONTENT => {
                return Err(OdFetchError::Transient {
                    url: entry.source.to_string(),
                });
            }
            status => {
                return Err(OdFetchError::HttpStatus {
                    url: entry.source.to_string(),
                    status,
                    body: String::new(),
                });
            }
        }

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = tokio::fs::File::create(destination)
            .await
            .map_err(|e| OdFetchError::FileWrite {
                path: destination.to_path_buf(),
                reason: e.to_string(),
            })?;
        let mut writer = BufWriter::new(file);

        let mut body = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| OdFetchError::FileWrite {
                    path: destination.to_path_buf(),
                    reason: e.to_string(),
                })?;
            written += chunk.len() as u64;
        }
        writer.flush().await.map_err(|e| OdFetchError::FileWrite {
            path: destination.to_path_buf(),
            reason: e.to_string(),
        })?;

        tracing::debug!(
            index = attempt.index,
            output = %destination.display(),
            bytes = written,
            "Wrote part"
        );
        Ok(())
    }
}
