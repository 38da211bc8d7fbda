//! Rio Links Back binary entrypoint wiring REST, SSE, the local score file and CouchDB.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rio_links_back::{
    config::AppConfig,
    dao::score_store::local::JsonFileStore,
    routes,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let local_store = Arc::new(JsonFileStore::new(config.data_path.clone()));
    info!(path = %local_store.path().display(), "using local score file");

    let app_state = AppState::new(config, local_store);
    spawn_remote_supervisor(&app_state);

    // Build the HTTP router once the shared state is ready.
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

/// Start the CouchDB supervisor when the remote store is configured.
#[cfg(feature = "couch-store")]
fn spawn_remote_supervisor(state: &SharedState) {
    use rio_links_back::{
        dao::{
            score_store::{
                RemoteStore,
                couchdb::{CouchConfig, CouchScoreStore},
            },
            storage::StorageError,
        },
        services::storage_supervisor,
    };

    let config = match CouchConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "CouchDB not configured; running on the local score file only");
            return;
        }
    };
    info!(base_url = %config.base_url, database = %config.database, doc_id = %config.doc_id, "remote store configured");

    tokio::spawn(storage_supervisor::run(state.clone(), move || {
        let config = config.clone();
        async move {
            let store = CouchScoreStore::connect(config)
                .await
                .map_err(StorageError::from)?;
            Ok::<_, StorageError>(Arc::new(store) as Arc<dyn RemoteStore>)
        }
    }));
}

#[cfg(not(feature = "couch-store"))]
fn spawn_remote_supervisor(_state: &SharedState) {
    warn!("built without a remote store; running on the local score file only");
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

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
