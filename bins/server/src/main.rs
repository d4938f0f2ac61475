//! Mugshot API Server
//!
//! Main entry point for the Mugshot backend service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mugshot_api::{AppState, create_router};
use mugshot_core::media::{EncoderConfig, SizeBoundedEncoder};
use mugshot_core::storage::{StorageProvider, StorageService};
use mugshot_db::connect;
use mugshot_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mugshot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Create JWT service
    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        token_expires_hours: config.jwt.token_expiry_hours,
    });

    // Resolve the storage backend once, from configuration completeness
    let provider = StorageProvider::resolve(&config.storage);
    let storage = StorageService::from_provider(provider, config.storage.media_base_url.clone())
        .map_err(|e| anyhow::anyhow!("failed to initialize storage: {e}"))?;
    info!(mode = %storage.mode(), "Storage backend resolved");

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        storage: Arc::new(storage),
        encoder: SizeBoundedEncoder::new(EncoderConfig::default()),
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
