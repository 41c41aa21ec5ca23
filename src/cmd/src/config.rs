use std::net::SocketAddr;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing::Level;

use crate::error::Error;

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Server {
    pub host: SocketAddr,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Data {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Auth {
    pub access_token_duration: String,
    pub refresh_token_duration: String,
    pub access_token_key: String,
    pub refresh_token_key: String,
}

#[derive(Debug, Deserialize, PartialEq, Eq, Default)]
pub struct Notifications {
    pub webhook_url: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Log {
    pub level: LogLevel,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub server: Server,
    pub data: Data,
    pub auth: Auth,
    #[serde(default)]
    pub notifications: Notifications,
    pub log: Log,
}

fn parse_duration(s: &str) -> crate::error::Result<chrono::Duration> {
    Ok(chrono::Duration::from_std(parse_duration::parse(s)?)?)
}

impl TryInto<common::config::Config> for Config {
    type Error = Error;

    fn try_into(self) -> Result<common::config::Config, Self::Error> {
        if self.auth.access_token_key.is_empty() || self.auth.refresh_token_key.is_empty() {
            return Err(Error::BadRequest(
                "auth.access_token_key and auth.refresh_token_key must be set".to_string(),
            ));
        }

        Ok(common::config::Config {
            server: common::config::Server {
                host: self.server.host,
            },
            data: common::config::Data {
                path: self.data.path,
            },
            auth: common::config::Auth {
                access_token_duration: parse_duration(self.auth.access_token_duration.as_str())?,
                refresh_token_duration: parse_duration(self.auth.refresh_token_duration.as_str())?,
                access_token_key: self.auth.access_token_key,
                refresh_token_key: self.auth.refresh_token_key,
            },
            notifications: common::config::Notifications {
                webhook_url: self.notifications.webhook_url.filter(|url| !url.is_empty()),
            },
            log: common::config::Log {
                level: self.log.level.into(),
            },
        })
    }
}

#[derive(Deserialize, Copy, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    #[serde(rename = "trace")]
    Trace,
    #[serde(rename = "debug")]
    Debug,
    #[serde(rename = "info")]
    Info,
    #[serde(rename = "warn")]
    Warn,
    #[serde(rename = "error")]
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
        .into()
    }
}
