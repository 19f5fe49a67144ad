//! `mailbridge` - inbox fetch over HTTP.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use mailbridge::{ServerError, Settings, router};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "mailbridge=info,mailbridge_core=info,mailbridge_imap=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;
    info!(
        bind = %settings.bind,
        policy = ?settings.options.policy,
        deadline = ?settings.options.deadline,
        "Starting mailbridge"
    );

    let listener = TcpListener::bind(settings.bind)
        .await
        .map_err(|source| ServerError::Bind {
            addr: settings.bind,
            source,
        })?;

    axum::serve(listener, router(settings.options))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("mailbridge stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
