use crate::cli::args::{Command, DownloadFlags};
use crate::cli::params::FetchParams;
use crate::config::{Config, load_config, parse_duration};
use crate::constants::defaults::{
    MAX_DURATION, OUTPUT_DIR, RATE_INTERVAL, REQUEST_TIMEOUT, RETRY_COUNT,
};
use crate::download::DownloadOptions;
use crate::error::OdFetchError;
use crate::manifest::ManifestSource;
use reqwest::Url;
use std::path::PathBuf;

/// Merges command-line flags with the optional config file and validates the result.
/// Flags win over the config file, which wins over built-in defaults.
pub fn resolve_command(command: Command) -> Result<FetchParams, OdFetchError> {
    let (config_path, source, flags) = match command {
        Command::Url {
            config_path,
            url,
            download,
        } => {
            let url = Url::parse(&url)
                .map_err(|e| OdFetchError::config(format!("invalid URL '{url}': {e}")))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(OdFetchError::config(format!(
                    "URL '{url}' must use http or https"
                )));
            }
            (config_path, ManifestSource::ReaderPage(url), download)
        }
        Command::File {
            config_path,
            descriptor_path,
            download,
        } => {
            let path = PathBuf::from(&descriptor_path);
            if !path.is_file() {
                return Err(OdFetchError::config(format!(
                    "media descriptor '{descriptor_path}' does not exist"
                )));
            }
            (config_path, ManifestSource::MediaDescriptor(path), download)
        }
    };

    let app_config = match config_path {
        Some(config_path) => {
            tracing::info!("Loading configuration from {}", config_path);
            load_config(&config_path)?
        }
        None => Config::default(),
    };

    merge(source, flags, app_config)
}

fn merge(
    source: ManifestSource,
    flags: DownloadFlags,
    app_config: Config,
) -> Result<FetchParams, OdFetchError> {
    let defaults = app_config.download;

    let output_dir = flags
        .output_dir
        .map(PathBuf::from)
        .or(defaults.output_dir)
        .unwrap_or_else(|| PathBuf::from(OUTPUT_DIR));

    let rate_interval = match flags.rate_interval.or(defaults.rate_interval) {
        Some(value) => parse_duration("rate-interval", &value)?,
        None => RATE_INTERVAL,
    };

    let request_timeout = match flags.request_timeout.or(defaults.request_timeout) {
        Some(value) => parse_duration("request-timeout", &value)?,
        None => REQUEST_TIMEOUT,
    };
    if request_timeout.is_zero() {
        return Err(OdFetchError::config("request-timeout must be greater than 0"));
    }
    for (name, value) in [
        ("rate-interval", rate_interval),
        ("request-timeout", request_timeout),
    ] {
        if value > MAX_DURATION {
            return Err(OdFetchError::config(format!(
                "{name} must not exceed {}",
                humantime::format_duration(MAX_DURATION)
            )));
        }
    }

    let retry_limit = flags
        .retry_count
        .or(defaults.retry_count)
        .unwrap_or(RETRY_COUNT);

    Ok(FetchParams {
        source,
        output_dir,
        options: DownloadOptions {
            rate_interval,
            retry_limit,
        },
        request_timeout,
        strict: flags.strict || defaults.strict.unwrap_or(false),
    })
}
