use super::executor::PartFetcher;
use super::rate_limiter::RateLimiter;
use super::types::{AttemptOutcome, DownloadAttempt, DownloadOptions, DownloadSummary};
use crate::error::OdFetchError;
use crate::manifest::DownloadManifest;
use std::path::Path;

/// Downloads every manifest entry in order, one request at a time.
///
/// Entries answered with a transient error are requeued at the tail until they have been
/// retried `retry_limit` times; after that they are recorded as failed and the run moves on.
/// Any other error aborts the run immediately.
pub async fn run_downloads<F: PartFetcher>(
    manifest: &DownloadManifest,
    fetcher: &F,
    output_dir: &Path,
    options: DownloadOptions,
) -> Result<DownloadSummary, OdFetchError> {
    let mut queue: Vec<DownloadAttempt<'_>> = manifest
        .entries()
        .iter()
        .enumerate()
        .map(|(position, entry)| DownloadAttempt::first(position + 1, entry))
        .collect();

    let mut limiter = RateLimiter::new(options.rate_interval);
    let mut summary = DownloadSummary::default();
    let mut cursor = 0;

    while let Some(&attempt) = queue.get(cursor) {
        cursor += 1;
        limiter.wait().await;

        tracing::info!(
            index = attempt.index,
            retry = attempt.retries,
            name = %attempt.entry.name,
            "Downloading part"
        );
        summary.attempts += 1;
        let destination = output_dir.join(&attempt.entry.name);
        let result = fetcher.fetch(&attempt, &destination).await;

        match classify(&attempt, result, options.retry_limit)? {
            AttemptOutcome::Succeeded => summary.succeeded.push(attempt.index),
            AttemptOutcome::RetryPending => {
                tracing::warn!(
                    index = attempt.index,
                    retry = attempt.retries + 1,
                    "Part returned no content, retrying later"
                );
                queue.push(attempt.retry());
            }
            AttemptOutcome::Failed => {
                tracing::error!(
                    index = attempt.index,
                    name = %attempt.entry.name,
                    "Part returned no content after {} retries, giving up",
                    attempt.retries
                );
                summary.failed.push(attempt.index);
            }
        }
    }

    tracing::info!(
        succeeded = summary.succeeded.len(),
        failed = summary.failed.len(),
        attempts = summary.attempts,
        "Finished downloading parts"
    );
    Ok(summary)
}

fn classify(
    attempt: &DownloadAttempt<'_>,
    result: Result<(), OdFetchError>,
    retry_limit: usize,
) -> Result<AttemptOutcome, OdFetchError> {
    match result {
        Ok(()) => Ok(AttemptOutcome::Succeeded),
        Err(err) if err.is_transient() => {
            if attempt.retries < retry_limit {
                Ok(AttemptOutcome::RetryPending)
            } else {
                Ok(AttemptOutcome::Failed)
            }
        }
        Err(err) => Err(OdFetchError::PartDownload {
            index: attempt.index,
            name: attempt.entry.name.clone(),
            source: Box::new(err),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestEntry;
    use parking_lot::Mutex;
    use reqwest::header::HeaderMap;
    use reqwest::{StatusCode, Url};
    use std::collections::{HashMap, VecDeque};
    use std::time::Duration;
    use tempfile::tempdir;
    use tokio::time::Instant;

    #[derive(Clone, Copy, Debug)]
    enum Reply {
        Ok,
        NoContent,
        Status(StatusCode),
    }

    /// Replays scripted replies per manifest index; unscripted calls succeed.
    #[derive(Default)]
    struct ScriptedFetcher {
        replies: Mutex<HashMap<usize, VecDeque<Reply>>>,
        calls: Mutex<Vec<(usize, usize, Instant)>>,
    }

    impl ScriptedFetcher {
        fn with(replies: &[(usize, &[Reply])]) -> Self {
            let fetcher = Self::default();
            {
                let mut scripted = fetcher.replies.lock();
                for (index, sequence) in replies {
                    scripted.insert(*index, sequence.iter().copied().collect());
                }
            }
            fetcher
        }

        fn order(&self) -> Vec<(usize, usize)> {
            self.calls
                .lock()
                .iter()
                .map(|(index, retries, _)| (*index, *retries))
                .collect()
        }
    }

    impl PartFetcher for ScriptedFetcher {
        async fn fetch(
            &self,
            attempt: &DownloadAttempt<'_>,
            destination: &Path,
        ) -> Result<(), OdFetchError> {
            self.calls
                .lock()
                .push((attempt.index, attempt.retries, Instant::now()));
            let reply = self
                .replies
                .lock()
                .get_mut(&attempt.index)
                .and_then(|replies| replies.pop_front())
                .unwrap_or(Reply::Ok);

            match reply {
                Reply::Ok => {
                    std::fs::write(destination, attempt.entry.name.as_bytes())?;
                    Ok(())
                }
                Reply::NoContent => Err(OdFetchError::Transient {
                    url: attempt.entry.source.to_string(),
                }),
                Reply::Status(status) => Err(OdFetchError::HttpStatus {
                    url: attempt.entry.source.to_string(),
                    status,
                    body: String::new(),
                }),
            }
        }
    }

    fn manifest(names: &[&str]) -> DownloadManifest {
        DownloadManifest::new(
            names
                .iter()
                .map(|name| ManifestEntry {
                    name: name.to_string(),
                    source: Url::parse(&format!("https://cdn.example.com/{name}")).unwrap(),
                    headers: HeaderMap::new(),
                })
                .collect(),
        )
        .unwrap()
    }

    fn options(retry_limit: usize) -> DownloadOptions {
        DownloadOptions {
            rate_interval: Duration::ZERO,
            retry_limit,
        }
    }

    #[tokio::test]
    async fn test_first_attempts_follow_manifest_order() {
        let dir = tempdir().unwrap();
        let fetcher = ScriptedFetcher::default();
        let summary = run_downloads(
            &manifest(&["a.mp3", "b.mp3", "c.mp3"]),
            &fetcher,
            dir.path(),
            options(3),
        )
        .await
        .unwrap();

        assert_eq!(fetcher.order(), vec![(1, 0), (2, 0), (3, 0)]);
        assert_eq!(summary.succeeded, vec![1, 2, 3]);
        assert!(summary.is_complete());
        assert_eq!(summary.attempts, 3);
    }

    #[tokio::test]
    async fn test_retry_is_appended_after_queued_attempts() {
        let dir = tempdir().unwrap();
        let fetcher = ScriptedFetcher::with(&[(1, &[Reply::NoContent])]);
        let summary = run_downloads(
            &manifest(&["a.mp3", "b.mp3", "c.mp3"]),
            &fetcher,
            dir.path(),
            options(3),
        )
        .await
        .unwrap();

        assert_eq!(fetcher.order(), vec![(1, 0), (2, 0), (3, 0), (1, 1)]);
        assert_eq!(summary.succeeded, vec![2, 3, 1]);
        assert!(summary.failed.is_empty());
        assert_eq!(std::fs::read_to_string(dir.path().join("a.mp3")).unwrap(), "a.mp3");
    }

    #[tokio::test]
    async fn test_retries_interleave_at_the_tail() {
        let dir = tempdir().unwrap();
        let fetcher = ScriptedFetcher::with(&[
            (1, &[Reply::NoContent, Reply::NoContent]),
            (2, &[Reply::NoContent]),
        ]);
        run_downloads(
            &manifest(&["a.mp3", "b.mp3"]),
            &fetcher,
            dir.path(),
            options(3),
        )
        .await
        .unwrap();

        assert_eq!(fetcher.order(), vec![(1, 0), (2, 0), (1, 1), (2, 1), (1, 2)]);
    }

    #[tokio::test]
    async fn test_exhausted_entry_fails_without_aborting() {
        let dir = tempdir().unwrap();
        let fetcher = ScriptedFetcher::with(&[(1, &[Reply::NoContent; 3])]);
        let summary = run_downloads(
            &manifest(&["a.mp3", "b.mp3"]),
            &fetcher,
            dir.path(),
            options(2),
        )
        .await
        .unwrap();

        assert_eq!(fetcher.order(), vec![(1, 0), (2, 0), (1, 1), (1, 2)]);
        assert_eq!(summary.succeeded, vec![2]);
        assert_eq!(summary.failed, vec![1]);
        assert!(!summary.is_complete());
        assert!(!dir.path().join("a.mp3").exists());
    }

    #[tokio::test]
    async fn test_zero_retry_limit_fails_on_first_no_content() {
        let dir = tempdir().unwrap();
        let fetcher = ScriptedFetcher::with(&[(1, &[Reply::NoContent])]);
        let summary = run_downloads(
            &manifest(&["a.mp3"]),
            &fetcher,
            dir.path(),
            options(0),
        )
        .await
        .unwrap();

        assert_eq!(fetcher.order(), vec![(1, 0)]);
        assert_eq!(summary.failed, vec![1]);
    }

    #[tokio::test]
    async fn test_attempts_are_bounded() {
        let dir = tempdir().unwrap();
        let always_empty = [Reply::NoContent; 10];
        let fetcher = ScriptedFetcher::with(&[
            (1, &always_empty),
            (2, &always_empty),
            (3, &always_empty),
        ]);
        let retry_limit = 4;
        let summary = run_downloads(
            &manifest(&["a.mp3", "b.mp3", "c.mp3"]),
            &fetcher,
            dir.path(),
            options(retry_limit),
        )
        .await
        .unwrap();

        assert_eq!(summary.attempts, 3 * (1 + retry_limit));
        assert_eq!(summary.failed, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fatal_status_aborts_the_run() {
        let dir = tempdir().unwrap();
        let fetcher = ScriptedFetcher::with(&[
            (1, &[Reply::NoContent]),
            (2, &[Reply::Status(StatusCode::NOT_FOUND)]),
        ]);
        let err = run_downloads(
            &manifest(&["a.mp3", "b.mp3", "c.mp3"]),
            &fetcher,
            dir.path(),
            options(3),
        )
        .await
        .unwrap_err();

        assert_eq!(fetcher.order(), vec![(1, 0), (2, 0)]);
        match err {
            OdFetchError::PartDownload { index, name, source } => {
                assert_eq!(index, 2);
                assert_eq!(name, "b.mp3");
                assert!(matches!(
                    *source,
                    OdFetchError::HttpStatus { status: StatusCode::NOT_FOUND, .. }
                ));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!dir.path().join("c.mp3").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_attempt_waits_for_the_interval() {
        let dir = tempdir().unwrap();
        let fetcher = ScriptedFetcher::with(&[(2, &[Reply::NoContent])]);
        let interval = Duration::from_secs(2);
        let start = Instant::now();

        run_downloads(
            &manifest(&["a.mp3", "b.mp3"]),
            &fetcher,
            dir.path(),
            DownloadOptions {
                rate_interval: interval,
                retry_limit: 1,
            },
        )
        .await
        .unwrap();

        let starts: Vec<Instant> = fetcher.calls.lock().iter().map(|(_, _, at)| *at).collect();
        assert_eq!(starts.len(), 3);
        assert!(starts[0] - start >= interval);
        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= interval);
        }
    }

    #[tokio::test]
    async fn test_empty_manifest_does_nothing() {
        let dir = tempdir().unwrap();
        let fetcher = ScriptedFetcher::default();
        let summary = run_downloads(
            &manifest(&[]),
            &fetcher,
            dir.path(),
            options(3),
        )
        .await
        .unwrap();
        assert_eq!(summary, DownloadSummary::default());
    }
}
