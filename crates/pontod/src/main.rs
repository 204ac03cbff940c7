use std::sync::Arc;

use anyhow::{Context, Result};
use ponto_core::ThresholdEvaluator;
use ponto_store::{ImageStore, RecordStore};
use pontod::auth::AuthConfig;
use pontod::config::Config;
use pontod::engine::spawn_engine;
use pontod::workflow::Workflow;
use pontod::{create_router, AppState};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("pontod starting");

    let config = Config::from_env();
    for var in config.insecure_defaults() {
        tracing::warn!(var, "using built-in default; set it before exposing the service");
    }
    tracing::info!(
        db = %config.db_path.display(),
        photos = %config.photos_dir.display(),
        threshold = config.similarity_threshold,
        "configuration loaded"
    );

    if let Some(parent) = config.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let records = RecordStore::open(&config.db_path)
        .await
        .with_context(|| format!("opening database {}", config.db_path.display()))?;
    let images = ImageStore::open(&config.photos_dir)
        .await
        .with_context(|| format!("opening photo directory {}", config.photos_dir.display()))?;

    // Models load on the first embedding request.
    let engine = spawn_engine(config.model_dir.clone())?;

    let workflow = Workflow::new(
        Arc::new(engine),
        records,
        images,
        ThresholdEvaluator::new(config.similarity_threshold),
    );
    let auth = AuthConfig::new(
        config.admin_username.clone(),
        &config.admin_password,
        config.jwt_secret.clone(),
    );
    let state = AppState::new(workflow, auth, config.max_upload_bytes);

    let router = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(addr = %listener.local_addr()?, "pontod ready");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .await?;

    tracing::info!("pontod shutting down");
    Ok(())
}
