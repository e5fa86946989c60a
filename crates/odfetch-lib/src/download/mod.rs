mod executor;
mod rate_limiter;
mod scheduler;
mod types;

pub use executor::{HttpPartFetcher, PartFetcher};
pub use rate_limiter::RateLimiter;
pub use scheduler::run_downloads;
pub use types::{AttemptOutcome, DownloadAttempt, DownloadOptions, DownloadSummary};
