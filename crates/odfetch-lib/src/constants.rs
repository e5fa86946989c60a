//! Fixed client identity presented to the distribution service.

/// Identity used when scraping the reader page.
pub mod reader {
    pub const USER_AGENT: &str = "nobody";
    pub const METADATA_FILE_NAME: &str = "metadata.json";
}

/// Identity of the desktop media console the license endpoint expects.
pub mod media_console {
    pub const CLIENT_ID: &str = "00000000-0000-0000-0000-000000000000";
    pub const OMC: &str = "1.2.0";
    pub const OS: &str = "10.14.2";
    pub const HASH_SECRET: &str = "ELOSNOC*AIDEM*EVIRDREVO";
    pub const USER_AGENT: &str = "OverDrive Media Console";
    pub const LICENSE_FILE_NAME: &str = "license.xml";
    pub const PART_EXTENSION: &str = "mp3";
    pub const DOWNLOAD_METHOD: &str = "download";
}

pub mod defaults {
    use std::time::Duration;

    pub const OUTPUT_DIR: &str = ".";
    pub const RATE_INTERVAL: Duration = Duration::from_secs(2);
    pub const RETRY_COUNT: usize = 3;
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

    /// Upper bound for any configured duration.
    pub const MAX_DURATION: Duration = Duration::from_secs(24 * 60 * 60);
}
