//! nova-onboard server entry point

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use nova_onboard::email::{MailerChain, spawn_notification_worker};
use nova_onboard::{AppState, Config, api};
use tokio_util::sync::CancellationToken;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Upper bound on delivering queued confirmation emails at shutdown
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);
const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "nova_onboard=info,tower_http=info".into());
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if std::env::var("LOG_FORMAT").is_ok_and(|v| v == "json") {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = Config::from_env().inspect_err(|e| tracing::error!("Invalid configuration: {e}"))?;
    tracing::info!(
        env = %config.environment,
        store = ?config.store_backend,
        "Starting nova-onboard"
    );

    let shutdown = CancellationToken::new();

    let mailer = MailerChain::from_config(&config)?;
    let (notifier, worker) = if mailer.is_empty() {
        tracing::warn!("No mail transport configured, confirmation emails disabled");
        (None, None)
    } else {
        let (notifier, handle) = spawn_notification_worker(
            Arc::new(mailer),
            config.notify_queue_capacity,
            shutdown.clone(),
        );
        (Some(notifier), Some(handle))
    };

    let state = AppState::from_config(&config, notifier)?;
    let app = api::create_router(state.clone())
        .layer(api::cors_layer(config.cors_allowed_origin.as_deref())?);

    // Periodic rate limiter cleanup
    let rate_limiter = state.rate_limiter.clone();
    let cleanup_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_CLEANUP_INTERVAL);
        loop {
            tokio::select! {
                _ = cleanup_shutdown.cancelled() => break,
                _ = interval.tick() => rate_limiter.cleanup().await,
            }
        }
    });

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("nova-onboard listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    shutdown.cancel();
    if let Some(worker) = worker
        && tokio::time::timeout(DRAIN_TIMEOUT, worker).await.is_err()
    {
        tracing::warn!("Notification queue not fully drained before shutdown");
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
