//! Aula API Server
//!
//! Main entry point for the Aula treasury backend.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aula_api::{AppState, create_router};
use aula_core::storage::{ReceiptStore, StorageProvider};
use aula_db::connect;
use aula_shared::config::StorageSettings;
use aula_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aula=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Create JWT service
    let jwt_config = JwtConfig {
        secret: config.jwt.secret.clone(),
        #[allow(clippy::cast_possible_wrap)]
        access_token_expires_minutes: (config.jwt.access_token_expiry_secs / 60) as i64,
    };
    let jwt_service = JwtService::new(jwt_config);

    // Create receipt store
    let receipts = build_receipt_store(&config.storage)?;
    info!(backend = %config.storage.backend, "Receipt storage configured");

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        receipts: Some(Arc::new(receipts)),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the receipt store from the configured backend.
fn build_receipt_store(settings: &StorageSettings) -> anyhow::Result<ReceiptStore> {
    let provider = match settings.backend.as_str() {
        "fs" => StorageProvider::local_fs(settings.root.clone()),
        "s3" => StorageProvider::S3 {
            endpoint: settings
                .endpoint
                .clone()
                .context("storage.endpoint is required for the s3 backend")?,
            bucket: settings
                .bucket
                .clone()
                .context("storage.bucket is required for the s3 backend")?,
            access_key_id: settings
                .access_key_id
                .clone()
                .context("storage.access_key_id is required for the s3 backend")?,
            secret_access_key: settings
                .secret_access_key
                .clone()
                .context("storage.secret_access_key is required for the s3 backend")?,
            region: settings
                .region
                .clone()
                .context("storage.region is required for the s3 backend")?,
        },
        "azblob" => StorageProvider::AzureBlob {
            account: settings
                .access_key_id
                .clone()
                .context("storage.access_key_id is required for the azblob backend")?,
            access_key: settings
                .secret_access_key
                .clone()
                .context("storage.secret_access_key is required for the azblob backend")?,
            container: settings
                .bucket
                .clone()
                .context("storage.bucket is required for the azblob backend")?,
        },
        other => anyhow::bail!("Unknown storage backend: {other}"),
    };

    ReceiptStore::from_provider(&provider, settings.public_base_url.clone())
        .context("Failed to initialize receipt storage")
}
