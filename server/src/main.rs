//! Registration service binary.
//!
//! Connects the PostgreSQL store, runs migrations, and serves the JSON API
//! with graceful shutdown on ctrl-c.
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/clubdesk cargo run --bin clubdesk-server
//! ```

use clubdesk_postgres::PgRegistrationStore;
use clubdesk_server::notify::LogNotifier;
use clubdesk_server::{build_router, AppState, Config};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,clubdesk=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(
        postgres = %config.postgres.url,
        host = %config.server.host,
        port = config.server.port,
        "configuration loaded"
    );

    if config.server.metrics_port != 0 {
        let metrics_addr: SocketAddr = format!(
            "{}:{}",
            config.server.metrics_host, config.server.metrics_port
        )
        .parse()?;
        match metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .install()
        {
            Ok(()) => tracing::info!(%metrics_addr, "prometheus exporter listening"),
            Err(e) => tracing::warn!(error = %e, "prometheus exporter disabled"),
        }
    }
    clubdesk_server::metrics::register_business_metrics();

    let store = PgRegistrationStore::connect(&config.pg_store_config()).await?;
    store.run_migrations().await?;
    tracing::info!("store connected, schema up to date");

    let state = AppState::new(Arc::new(store), Arc::new(LogNotifier));
    let app = build_router(state);

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "registration service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
