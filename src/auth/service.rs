use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use super::errors::AuthError;
use super::password::CredentialVerifier;
use crate::accounts::{Account, AccountStore};

/// Login and password-change flows over an [`AccountStore`].
///
/// Neither flow retries: the first failure ends the request. Session or token
/// issuance after login is not provided here.
#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    verifier: CredentialVerifier,
}

impl AuthService {
    pub fn new(accounts: Arc<dyn AccountStore>, verifier: CredentialVerifier) -> Self {
        Self { accounts, verifier }
    }

    /// Resolves the account by email and checks the password.
    ///
    /// An unknown email comes back as [`AuthError::NotFound`], not as
    /// `InvalidCredentials`.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let account = self.accounts.find_by_email(email).await.map_err(|e| {
            warn!(error = %e, "account lookup failed");
            AuthError::from(e)
        })?;

        self.check_password(&account, password)?;

        info!(account_id = account.id, "account authenticated");
        Ok(account)
    }

    #[instrument(skip(self, old_password, new_password))]
    pub async fn change_password(
        &self,
        id: i64,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let mut account = self.accounts.find_by_id(id).await.map_err(|e| {
            warn!(error = %e, "account lookup failed");
            AuthError::from(e)
        })?;

        self.check_password(&account, old_password)?;

        let hash = self.verifier.hash(new_password).map_err(|e| {
            error!(error = %e, account_id = id, "hash new password failed");
            AuthError::Internal(e.to_string())
        })?;
        account.set_password_hash(hash);

        self.accounts
            .update_password_hash(account.id, &account.password_hash)
            .await?;

        info!(account_id = id, "password changed");
        Ok(())
    }

    fn check_password(&self, account: &Account, password: &str) -> Result<(), AuthError> {
        match self.verifier.verify(password, &account.password_hash) {
            Ok(true) => Ok(()),
            Ok(false) => {
                warn!(account_id = account.id, "password mismatch");
                Err(AuthError::InvalidCredentials)
            }
            Err(e) => {
                warn!(account_id = account.id, error = %e, "stored hash unusable");
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::memory::fixtures::account;
    use crate::accounts::InMemoryAccountStore;
    use crate::auth::password::test_verifier;
    use std::time::Duration;

    async fn service_with(accounts: Vec<(i64, &str, &str)>) -> (AuthService, Arc<InMemoryAccountStore>) {
        let verifier = test_verifier();
        let store = Arc::new(InMemoryAccountStore::new(Duration::from_secs(5)));
        for (id, email, password) in accounts {
            store.insert(account(id, email, verifier.hash(password).unwrap())).await;
        }
        (AuthService::new(store.clone(), verifier), store)
    }

    #[tokio::test]
    async fn login_succeeds_with_correct_password() {
        let (svc, _) = service_with(vec![(1, "a@b.com", "secret1")]).await;

        let account = svc.authenticate("a@b.com", "secret1").await.unwrap();
        assert_eq!(account.id, 1);

        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let (svc, _) = service_with(vec![(1, "a@b.com", "secret1")]).await;

        let err = svc.authenticate("a@b.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_with_unknown_email_is_not_authenticated() {
        let (svc, _) = service_with(vec![(1, "a@b.com", "secret1")]).await;

        let err = svc.authenticate("x@y.com", "anything").await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound));
    }

    #[tokio::test]
    async fn malformed_stored_hash_reads_as_invalid_credentials() {
        let store = Arc::new(InMemoryAccountStore::new(Duration::from_secs(5)));
        store.insert(account(1, "a@b.com", "plaintext-oops".into())).await;
        let svc = AuthService::new(store, test_verifier());

        let err = svc.authenticate("a@b.com", "plaintext-oops").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(err.to_string(), "invalid credentials");
    }

    #[tokio::test]
    async fn change_password_then_login_with_new_password() {
        let (svc, store) = service_with(vec![(7, "a@b.com", "old1")]).await;

        svc.change_password(7, "old1", "new123456").await.unwrap();

        assert_eq!(svc.authenticate("a@b.com", "new123456").await.unwrap().id, 7);
        assert!(matches!(
            svc.authenticate("a@b.com", "old1").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(!store.find_by_id(7).await.unwrap().password_change_required);
    }

    #[tokio::test]
    async fn change_password_rejects_wrong_old_password_without_writing() {
        let (svc, store) = service_with(vec![(7, "a@b.com", "old1")]).await;
        let before = store.find_by_id(7).await.unwrap().password_hash;

        let err = svc.change_password(7, "not-old", "new123456").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let after = store.find_by_id(7).await.unwrap();
        assert_eq!(after.password_hash, before);
        assert!(after.password_change_required);
    }

    #[tokio::test]
    async fn change_password_for_unknown_id_is_not_found() {
        let (svc, _) = service_with(vec![]).await;

        let err = svc.change_password(99, "old1", "new123456").await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound));
    }

    #[tokio::test]
    async fn slow_store_surfaces_as_store_error() {
        let verifier = test_verifier();
        let store = Arc::new(
            InMemoryAccountStore::new(Duration::from_millis(50)).with_latency(Duration::from_secs(5)),
        );
        store.insert(account(1, "a@b.com", verifier.hash("secret1").unwrap())).await;
        let svc = AuthService::new(store, verifier);

        let err = svc.authenticate("a@b.com", "secret1").await.unwrap_err();
        assert!(matches!(err, AuthError::Store(crate::accounts::StoreError::Timeout(_))));
    }

    #[tokio::test]
    async fn change_password_lookup_failure_surfaces_like_login() {
        let verifier = test_verifier();
        let store = Arc::new(
            InMemoryAccountStore::new(Duration::from_millis(50)).with_latency(Duration::from_secs(5)),
        );
        store.insert(account(1, "a@b.com", verifier.hash("old123").unwrap())).await;
        let svc = AuthService::new(store, verifier);

        let err = svc.change_password(1, "old123", "new123456").await.unwrap_err();
        assert!(matches!(err, AuthError::Store(crate::accounts::StoreError::Timeout(_))));
    }
}
