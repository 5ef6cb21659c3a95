//! Christmas Mysteries backend entrypoint wiring REST routes, the Telegram
//! console, and the content store supervisor.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use christmas_mysteries_back::{catalog, config, routes, services};
use christmas_mysteries_back::dao::content_store::{
    ContentStore, RestContentStore, RestStoreConfig,
};
use christmas_mysteries_back::state::{AppState, SharedState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let app_config = config::AppConfig::from_env();
    let store_config = match RestStoreConfig::from_env() {
        Ok(store_config) => Some(store_config),
        Err(_) => None,
    };
    let catalog = catalog::StaticContentCatalog::load();

    if app_config.bot_token.is_none() {
        info!("no bot token configured; admin console disabled");
    }

    let app_state = AppState::new(app_config, store_config.clone(), catalog);

    match store_config {
        Some(store_config) => {
            let supervised = app_state.clone();
            tokio::spawn(services::store_supervisor::run(supervised, move || {
                let store_config = store_config.clone();
                async move {
                    let store = RestContentStore::connect(store_config).await?;
                    Ok(Arc::new(store) as Arc<dyn ContentStore>)
                }
            }));
        }
        None => info!("content store not configured; serving bundled catalog only"),
    }

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
