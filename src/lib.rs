pub mod api;
pub mod config;
pub mod model;
pub mod seed;
pub mod store;

pub use api::handlers;
pub use api::routes;

pub use model::*;

pub use store::{CloudantStore, Credentials, DocumentStore, MemoryStore, StoreError};

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use secrecy::Secret;
use tokio::net::TcpListener;

use crate::api::handlers::AppState;
use crate::config::{AppConfig, AuthKind, Backend};
use crate::store::IamAuthenticator;

/// Load configuration, connect to the configured store and serve until shutdown.
pub async fn run_server() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    log::info!(
        "Configuration loaded: server={}:{} service={:?} backend={:?}",
        config.server.host,
        config.server.port,
        config.service.kind,
        config.cloudant.backend
    );

    match config.cloudant.backend {
        Backend::Cloudant => serve_store(connect_cloudant(&config)?, &config).await,
        Backend::Memory => serve_store(memory_store(&config)?, &config).await,
    }
}

/// Build the Cloudant store for the configured auth mode
pub fn connect_cloudant(config: &AppConfig) -> anyhow::Result<CloudantStore> {
    let url = config.cloudant_url()?;
    let client = CloudantStore::http_client(Duration::from_secs(
        config.cloudant.request_timeout_secs,
    ))
    .context("Failed to build HTTP client")?;

    let credentials = match config.cloudant.auth {
        AuthKind::Iam => Credentials::Iam(IamAuthenticator::new(
            client.clone(),
            &config.cloudant.iam_token_url,
            Secret::new(config.api_key()?.to_string()),
        )),
        AuthKind::Basic => Credentials::Basic {
            username: config.cloudant.username.clone().unwrap_or_else(|| "apikey".to_string()),
            password: Secret::new(config.api_key()?.to_string()),
        },
        AuthKind::None => Credentials::None,
    };

    Ok(CloudantStore::new(url, client, credentials))
}

/// Memory store with both configured databases present, seeded if a file is set
pub fn memory_store(config: &AppConfig) -> anyhow::Result<MemoryStore> {
    let store = MemoryStore::new();
    store.create_database(&config.service.dealerships_db);
    store.create_database(&config.service.reviews_db);

    if let Some(path) = &config.cloudant.seed_file {
        let loaded = seed::load_seed_file(&store, path)?;
        log::info!("Loaded {} seed documents from {}", loaded, path);
    }

    Ok(store)
}

async fn serve_store<S: DocumentStore + 'static>(store: S, config: &AppConfig) -> anyhow::Result<()> {
    let database = config.primary_database();
    match store.ping(database).await {
        Ok(()) => log::info!("Connect success! Connected to database '{}'", database),
        Err(err) => {
            log::error!("Connect failure: {} for database '{}'", err, database);
            return Err(err).with_context(|| format!("Failed to connect to database '{}'", database));
        }
    }

    let state = AppState::new(Arc::new(store), &config.service);
    let app: axum::Router = api::routes::create_router(config.service.kind).with_state(state);

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    log::info!("Server is running on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                log::error!("Failed to install SIGTERM handler: {}", err);
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

    log::info!("Shutdown signal received");
}
