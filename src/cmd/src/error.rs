use std::net::AddrParseError;
use std::result;

use metadata::error::MetadataError;
use platform::PlatformError;
use thiserror::Error;

pub type Result<T> = result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal: {0}")]
    Internal(String),
    #[error("config: {0:?}")]
    Config(#[from] config::ConfigError),
    #[error("can't set global default subscriber: {0:?}")]
    SetGlobalDefaultError(#[from] tracing::subscriber::SetGlobalDefaultError),
    #[error("IP Address Parse Error: {0:?}")]
    AddrParseError(#[from] AddrParseError),
    #[error("StdIO: {0:?}")]
    StdIO(#[from] std::io::Error),
    #[error("TimeDurationOutOfRange: {0:?}")]
    TimeDurationOutOfRange(#[from] chrono::OutOfRangeError),
    #[error("ParseDuration: {0:?}")]
    ParseDuration(#[from] parse_duration::parse::Error),
    #[error("metadata: {0:?}")]
    Metadata(#[from] MetadataError),
    #[error("platform: {0:?}")]
    Platform(#[from] PlatformError),
    #[error("other: {0:?}")]
    Other(#[from] anyhow::Error),
}
