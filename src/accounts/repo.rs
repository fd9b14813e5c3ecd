use std::{future::Future, time::Duration};

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, error};

use super::model::Account;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Lookups and mutations needed by the authentication flows.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Account, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Account, StoreError>;
    /// Overwrites the stored hash and clears `password_change_required`.
    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<(), StoreError>;
}

/// Runs `fut` under `budget`. The future is dropped on expiry, which hands
/// any pooled connection it holds back to the pool.
pub(crate) async fn bounded<T, F>(op: &'static str, budget: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(budget, fut).await {
        Ok(res) => res,
        Err(_) => {
            error!(op, budget_ms = budget.as_millis() as u64, "store operation timed out");
            Err(StoreError::Timeout(budget))
        }
    }
}

const ACCOUNT_COLUMNS: &str = "id, role_id, email, password_hash, password_change_required, \
     is_active, last_login_at, created_at, updated_at";

#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
    query_timeout: Duration,
}

impl PgAccountStore {
    pub fn new(db: PgPool, query_timeout: Duration) -> Self {
        Self { db, query_timeout }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Account, StoreError> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        bounded("find_by_email", self.query_timeout, async {
            sqlx::query_as::<_, Account>(&query)
                .bind(email)
                .fetch_optional(&self.db)
                .await?
                .ok_or(StoreError::NotFound)
        })
        .await
    }

    async fn find_by_id(&self, id: i64) -> Result<Account, StoreError> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        bounded("find_by_id", self.query_timeout, async {
            sqlx::query_as::<_, Account>(&query)
                .bind(id)
                .fetch_optional(&self.db)
                .await?
                .ok_or(StoreError::NotFound)
        })
        .await
    }

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<(), StoreError> {
        bounded("update_password_hash", self.query_timeout, async {
            let res = sqlx::query(
                r#"
                UPDATE accounts
                   SET password_hash = $1, password_change_required = FALSE
                 WHERE id = $2
                "#,
            )
            .bind(password_hash)
            .bind(id)
            .execute(&self.db)
            .await?;

            if res.rows_affected() == 0 {
                return Err(StoreError::NotFound);
            }
            debug!(account_id = id, "password hash updated");
            Ok(())
        })
        .await
    }
}
