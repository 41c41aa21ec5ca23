use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Duration;
use tracing::level_filters::LevelFilter;

#[derive(Debug, Clone)]
pub struct Server {
    pub host: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct Data {
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Auth {
    pub access_token_duration: Duration,
    pub refresh_token_duration: Duration,
    pub access_token_key: String,
    pub refresh_token_key: String,
}

#[derive(Debug, Clone, Default)]
pub struct Notifications {
    /// Registration/cancellation notices are POSTed here when set.
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Log {
    pub level: LevelFilter,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: Server,
    pub data: Data,
    pub auth: Auth,
    pub notifications: Notifications,
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: Server {
                host: SocketAddr::from(([0, 0, 0, 0], 8080)),
            },
            data: Data {
                path: Default::default(),
            },
            auth: Auth {
                access_token_duration: Duration::minutes(15),
                refresh_token_duration: Duration::days(30),
                access_token_key: Default::default(),
                refresh_token_key: Default::default(),
            },
            notifications: Notifications::default(),
            log: Log {
                level: LevelFilter::INFO,
            },
        }
    }
}
