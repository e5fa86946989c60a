pub mod cli;
pub mod config;
pub mod constants;
pub mod download;
pub mod error;
pub mod http;
pub mod manifest;

pub use config::Config;
pub use error::OdFetchError;
