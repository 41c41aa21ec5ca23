use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use tracing::info;

use crate::registrations::Attendance;
use crate::Result;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Sent after a registration is created or cancelled.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notification {
    #[serde(rename_all = "camelCase")]
    Registered {
        event_title: String,
        attendance: Attendance,
    },
    #[serde(rename_all = "camelCase")]
    Cancelled {
        event_title: String,
        attendance: Attendance,
    },
}

impl Notification {
    pub fn attendance(&self) -> &Attendance {
        match self {
            Notification::Registered { attendance, .. }
            | Notification::Cancelled { attendance, .. } => attendance,
        }
    }
}

/// Delivery of registration notices. Failures are reported to the caller,
/// which decides whether they matter.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Writes notices to the log.
#[derive(Default)]
pub struct LogNotifier {}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        match notification {
            Notification::Registered {
                event_title,
                attendance,
            } => info!(
                "{} <{}> registered for \"{}\" ({})",
                attendance.name, attendance.email, event_title, attendance.mode
            ),
            Notification::Cancelled {
                event_title,
                attendance,
            } => info!(
                "{} <{}> cancelled registration for \"{}\"",
                attendance.name, attendance.email, event_title
            ),
        }

        Ok(())
    }
}

/// POSTs notices as JSON to a fixed url.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn try_new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        self.client
            .post(&self.url)
            .json(notification)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

/// Picks the notifier for `cfg`: the webhook when a url is set, the log
/// otherwise.
pub fn from_config(cfg: &common::config::Notifications) -> Result<Arc<dyn Notifier>> {
    match &cfg.webhook_url {
        Some(url) => Ok(Arc::new(WebhookNotifier::try_new(url.as_str())?)),
        None => Ok(Arc::new(LogNotifier::default())),
    }
}
