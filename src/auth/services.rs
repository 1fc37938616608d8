use anyhow::Context;
use uuid::Uuid;

use super::{jwt::TokenSigner, password::PasswordHasher};
use crate::{
    config::{JwtConfig, PasswordConfig},
    error::AppError,
};

/// Owns the credential and token lifecycle: hashing and verifying
/// passwords, issuing and validating bearer tokens.
///
/// The secret and the hashing cost are fixed at construction. Cloning is
/// cheap enough to hand one to every request.
#[derive(Clone)]
pub struct CredentialManager {
    hasher: PasswordHasher,
    signer: TokenSigner,
}

impl CredentialManager {
    pub fn new(jwt: &JwtConfig, password: &PasswordConfig) -> anyhow::Result<Self> {
        Ok(Self {
            hasher: PasswordHasher::new(password)?,
            signer: TokenSigner::new(jwt)?,
        })
    }

    /// Hashing runs on the blocking pool; it is deliberately slow and would
    /// otherwise hold up an async worker.
    pub async fn hash_password(&self, plain: &str) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        let plain = plain.to_owned();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .context("password hashing task")??;
        Ok(hash)
    }

    /// `Ok(false)` for a wrong password; errors only when the stored hash
    /// cannot be parsed.
    pub async fn verify_password(&self, plain: &str, hash: &str) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        let (plain, hash) = (plain.to_owned(), hash.to_owned());
        let ok = tokio::task::spawn_blocking(move || hasher.verify(&plain, &hash))
            .await
            .context("password verification task")??;
        Ok(ok)
    }

    pub fn issue_token(&self, user_id: Uuid) -> Result<String, AppError> {
        Ok(self.signer.issue(user_id)?)
    }

    pub fn validate_token(&self, token: &str) -> Result<Uuid, AppError> {
        self.signer.validate(token)
    }
}

#[cfg(test)]
pub(crate) fn test_manager() -> CredentialManager {
    let jwt = JwtConfig {
        secret: "test".into(),
        issuer: "test-issuer".into(),
        audience: "test-aud".into(),
        ttl_minutes: Some(5),
    };
    CredentialManager::new(&jwt, &super::password::cheap_config()).expect("test manager")
}
