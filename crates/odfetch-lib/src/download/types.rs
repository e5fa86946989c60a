use crate::constants::defaults::{RATE_INTERVAL, RETRY_COUNT};
use crate::manifest::ManifestEntry;
use std::time::Duration;

/// One scheduled execution of a manifest entry.
#[derive(Clone, Copy, Debug)]
pub struct DownloadAttempt<'a> {
    /// 1-based position of the entry in the manifest. Stable across retries.
    pub index: usize,
    /// How many times this entry has already been requeued.
    pub retries: usize,
    pub entry: &'a ManifestEntry,
}

impl<'a> DownloadAttempt<'a> {
    pub fn first(index: usize, entry: &'a ManifestEntry) -> Self {
        Self {
            index,
            retries: 0,
            entry,
        }
    }

    pub fn retry(self) -> Self {
        Self {
            retries: self.retries + 1,
            ..self
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
    Succeeded,
    RetryPending,
    Failed,
}

#[derive(Clone, Copy, Debug)]
pub struct DownloadOptions {
    /// Minimum spacing between the start of consecutive requests. Zero disables pacing.
    pub rate_interval: Duration,
    pub retry_limit: usize,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            rate_interval: RATE_INTERVAL,
            retry_limit: RETRY_COUNT,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Manifest indices that were written, in completion order.
    pub succeeded: Vec<usize>,
    /// Manifest indices that ran out of retries.
    pub failed: Vec<usize>,
    pub attempts: usize,
}

impl DownloadSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
