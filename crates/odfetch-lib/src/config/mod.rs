mod loader;
mod model;

pub use loader::load_config;
pub use model::{Config, DownloadConfig};

use crate::error::OdFetchError;
use std::time::Duration;

pub fn parse_duration(name: &str, value: &str) -> Result<Duration, OdFetchError> {
    humantime::parse_duration(value)
        .map_err(|e| OdFetchError::config(format!("invalid {name} '{value}': {e}")))
}
