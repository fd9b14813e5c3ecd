use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::model::Account;
use super::repo::{bounded, AccountStore, StoreError};

/// In-process account store with the same contract as the Postgres one,
/// including the per-call timeout budget.
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<i64, Account>>,
    query_timeout: Duration,
    latency: Option<Duration>,
}

impl InMemoryAccountStore {
    pub fn new(query_timeout: Duration) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            query_timeout,
            latency: None,
        }
    }

    /// Delays every call by `latency` before touching the map.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub async fn insert(&self, account: Account) {
        self.accounts.write().await.insert(account.id, account);
    }

    async fn simulate_io(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Account, StoreError> {
        bounded("find_by_email", self.query_timeout, async {
            self.simulate_io().await;
            self.accounts
                .read()
                .await
                .values()
                .find(|a| a.email == email)
                .cloned()
                .ok_or(StoreError::NotFound)
        })
        .await
    }

    async fn find_by_id(&self, id: i64) -> Result<Account, StoreError> {
        bounded("find_by_id", self.query_timeout, async {
            self.simulate_io().await;
            self.accounts
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or(StoreError::NotFound)
        })
        .await
    }

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<(), StoreError> {
        bounded("update_password_hash", self.query_timeout, async {
            self.simulate_io().await;
            let mut accounts = self.accounts.write().await;
            let account = accounts.get_mut(&id).ok_or(StoreError::NotFound)?;
            account.set_password_hash(password_hash.to_string());
            Ok(())
        })
        .await
    }
}
