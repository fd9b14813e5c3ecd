use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::error;

use crate::config::PasswordConfig;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("malformed password hash: {0}")]
    MalformedHash(String),
    #[error("password hashing failed: {0}")]
    Crypto(String),
}

/// Argon2id hashing with a configured work factor.
///
/// Verification reads the params embedded in the stored hash, so hashes made
/// under an older work factor keep verifying after the config changes.
#[derive(Clone)]
pub struct CredentialVerifier {
    params: Params,
}

impl CredentialVerifier {
    pub fn new(cfg: &PasswordConfig) -> anyhow::Result<Self> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 work factor: {e}"))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, plain: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                CredentialError::Crypto(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    pub fn verify(&self, plain: &str, hash: &str) -> Result<bool, CredentialError> {
        let parsed =
            PasswordHash::new(hash).map_err(|e| CredentialError::MalformedHash(e.to_string()))?;
        match self.argon2().verify_password(plain.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e @ (password_hash::Error::Algorithm
            | password_hash::Error::Version
            | password_hash::Error::ParamValueInvalid(_)
            | password_hash::Error::SaltInvalid(_)
            | password_hash::Error::OutputSize { .. })) => {
                Err(CredentialError::MalformedHash(e.to_string()))
            }
            Err(e) => {
                error!(error = %e, "argon2 verify_password error");
                Err(CredentialError::Crypto(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn test_verifier() -> CredentialVerifier {
    CredentialVerifier::new(&PasswordConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .expect("test params are valid")
}
