use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use local_services::config::{AppConfig, StorageBackend};
use local_services::db;
use local_services::routes;
use local_services::services::messaging::whatsapp::WhatsAppProvider;
use local_services::services::storage::cloudinary::CloudinaryStorage;
use local_services::services::storage::local::LocalDiskStorage;
use local_services::services::storage::MediaStorage;
use local_services::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    config.validate()?;

    let conn = db::init_db(&config.database_url)?;

    let storage: Box<dyn MediaStorage> = match config.storage {
        StorageBackend::Cloudinary => {
            tracing::info!("using Cloudinary media storage (cloud: {})", config.cloudinary_cloud_name);
            Box::new(CloudinaryStorage::new(
                config.cloudinary_cloud_name.clone(),
                config.cloudinary_api_key.clone(),
                config.cloudinary_api_secret.clone(),
            ))
        }
        StorageBackend::Local => {
            tracing::info!("using local media storage (dir: {})", config.upload_dir);
            Box::new(LocalDiskStorage::new(&config.upload_dir, &config.public_base_url))
        }
    };
    let messaging = WhatsAppProvider::new(&config);

    tracing::info!("OTP delivery mode: {}", config.mode.as_str());

    let addr = format!("0.0.0.0:{}", config.port);
    let state = Arc::new(AppState::new(conn, config, Box::new(messaging), storage));
    let app = routes::app(state);

    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
