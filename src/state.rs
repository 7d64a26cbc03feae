use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::auth::token::TokenIssuer;
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::messaging::MessagingProvider;
use crate::services::storage::MediaStorage;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub tokens: TokenIssuer,
    pub messaging: Box<dyn MessagingProvider>,
    pub storage: Box<dyn MediaStorage>,
}

impl AppState {
    pub fn new(
        conn: Connection,
        config: AppConfig,
        messaging: Box<dyn MessagingProvider>,
        storage: Box<dyn MediaStorage>,
    ) -> Self {
        let tokens = TokenIssuer::new(&config.jwt_secret, config.jwt_ttl_hours);
        Self {
            db: Arc::new(Mutex::new(conn)),
            config,
            tokens,
            messaging,
            storage,
        }
    }

    /// Locks the shared connection. Never hold the guard across an `.await`.
    pub fn db(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.db
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("database lock poisoned")))
    }
}
