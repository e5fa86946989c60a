use crate::cli::FetchParams;
use crate::download::{DownloadSummary, HttpPartFetcher, run_downloads};
use crate::error::OdFetchError;
use crate::http::build_client;
use crate::manifest::resolve;
use tracing;

pub async fn run_fetch(params: FetchParams) -> Result<DownloadSummary, OdFetchError> {
    let FetchParams {
        source,
        output_dir,
        options,
        request_timeout,
        strict,
    } = params;

    tokio::fs::create_dir_all(&output_dir).await.map_err(|e| {
        OdFetchError::config(format!(
            "cannot create output directory {}: {e}",
            output_dir.display()
        ))
    })?;

    let client = build_client(request_timeout)?;
    let manifest = resolve(&client, &source, &output_dir).await?;

    tracing::info!(
        "Downloading {} parts to {}",
        manifest.len(),
        output_dir.display()
    );
    let fetcher = HttpPartFetcher::new(client);
    let summary = run_downloads(&manifest, &fetcher, &output_dir, options).await?;

    if !summary.is_complete() {
        tracing::warn!(
            failed = ?summary.failed,
            "Some parts could not be downloaded"
        );
        if strict {
            return Err(OdFetchError::RetriesExhausted {
                failed: summary.failed,
            });
        }
    }

    tracing::info!("Download completed");
    Ok(summary)
}
