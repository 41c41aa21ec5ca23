use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use common::config::Config;
use common::DATA_PATH_METADATA;
use metadata::MetadataProvider;
use tokio::select;
use tokio::signal::unix::SignalKind;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::error::Result;
use crate::init_admin;
use crate::init_platform;

async fn shutdown_signal() {
    let (mut sig_int, mut sig_term) = match (
        tokio::signal::unix::signal(SignalKind::interrupt()),
        tokio::signal::unix::signal(SignalKind::terminate()),
    ) {
        (Ok(sig_int), Ok(sig_term)) => (sig_int, sig_term),
        (Err(err), _) | (_, Err(err)) => {
            warn!("can't install signal handlers: {err}");
            return std::future::pending().await;
        }
    };

    select! {
        _ = sig_int.recv() => info!("SIGINT received"),
        _ = sig_term.recv() => info!("SIGTERM received"),
    }
}

pub async fn start(cfg: Config) -> Result<()> {
    debug!("db path: {:?}", cfg.data.path);

    fs::create_dir_all(&cfg.data.path)?;
    let rocks = Arc::new(metadata::rocksdb::new(
        cfg.data.path.join(DATA_PATH_METADATA),
    )?);
    let md = Arc::new(MetadataProvider::try_new(rocks)?);

    init_admin(&md)?;

    let notifier = platform::notifications::from_config(&cfg.notifications)?;
    match &cfg.notifications.webhook_url {
        Some(url) => info!("notifications: webhook {url}"),
        None => info!("notifications: log"),
    }

    info!("initializing platform...");
    let router = init_platform(md, notifier, Router::new(), cfg.clone());

    info!("listening on http://{}", cfg.server.host);
    let listener = tokio::net::TcpListener::bind(cfg.server.host).await?;
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("server stopped");

    Ok(())
}
