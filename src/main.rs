//! FlowGuard server
//!
//! Serves the Dioxus UI and mounts the REST API under `/api`.

#[cfg(feature = "server")]
use anyhow::Result;

#[cfg(feature = "server")]
#[tokio::main]
async fn main() -> Result<()> {
    use flowguard::backend::{EmbeddedBackend, RemoteBackend, TrafficBackend};
    use flowguard::{api, app, config, store::Store};
    use std::{net::SocketAddr, sync::Arc, time::Duration};
    use tokio_util::sync::CancellationToken;
    use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "flowguard=debug,tower_http=debug,axum::rejection=trace".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting FlowGuard v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = config::load_config()?;
    tracing::info!(?config, "Configuration loaded");

    let backend: Arc<dyn TrafficBackend> = match config.remote_url() {
        Some(url) => {
            let remote =
                RemoteBackend::new(url, Duration::from_secs(config.backend.timeout_secs))?;
            tracing::info!("Forwarding API calls to {}", remote.base_url());
            Arc::new(remote)
        }
        None => {
            let store = Arc::new(Store::open(config.store.data_dir.as_deref())?);
            if config.store.seed_demo && store.is_empty().await {
                let added = store
                    .seed_demo(flowguard::backend::embedded::local_now())
                    .await;
                tracing::info!(readings = added, "Seeded demo network");
            }
            Arc::new(EmbeddedBackend::new(store))
        }
    };

    let app = dioxus::server::router(app::App)
        .nest("/api", api::router(api::AppState::new(backend)))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    // Stop accepting connections on Ctrl-C
    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Shutdown requested");
                    shutdown.cancel();
                }
                Err(e) => tracing::warn!("Failed to listen for Ctrl-C: {}", e),
            }
        }
    });

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

#[cfg(not(feature = "server"))]
fn main() {
    dioxus::launch(flowguard::app::App);
}
