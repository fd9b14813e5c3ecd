use std::sync::Arc;

use sqlx::PgPool;

use crate::accounts::{AccountStore, PgAccountStore};
use crate::auth::{AuthService, CredentialVerifier};
use crate::config::AppConfig;
use crate::db;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Connects to Postgres and wires the store and verifier from config.
    pub async fn init(config: AppConfig) -> anyhow::Result<(Self, PgPool)> {
        let db = db::connect(&config.db).await?;
        let accounts = Arc::new(PgAccountStore::new(db.clone(), config.db.query_timeout));
        let state = Self::from_parts(accounts, Arc::new(config))?;
        Ok((state, db))
    }

    pub fn from_parts(
        accounts: Arc<dyn AccountStore>,
        config: Arc<AppConfig>,
    ) -> anyhow::Result<Self> {
        let verifier = CredentialVerifier::new(&config.password)?;
        Ok(Self {
            auth: AuthService::new(accounts, verifier),
            config,
        })
    }
}
