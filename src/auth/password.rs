use anyhow::Context;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::config::PasswordConfig;

/// Argon2id hasher with a fixed cost, shared by every request.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new(cfg: &PasswordConfig) -> anyhow::Result<Self> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| anyhow::anyhow!(e.to_string()))
            .context("invalid argon2 parameters")?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn hash(&self, plain: &str) -> anyhow::Result<String> {
        anyhow::ensure!(!plain.is_empty(), "refusing to hash an empty password");
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// Salt and cost come from `hash` itself, so hashes made under an older
    /// cost still verify.
    pub fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            anyhow::anyhow!(e.to_string())
        })?;
        Ok(self
            .argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
pub(crate) fn cheap_config() -> PasswordConfig {
    PasswordConfig {
        memory_kib: 256,
        iterations: 1,
        parallelism: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(&cheap_config()).expect("valid params")
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let h = hasher();
        for password in ["Secur3P@ssw0rd!", "secret1", "ünïcødé 密码", " "] {
            let hash = h.hash(password).expect("hashing should succeed");
            assert!(h.verify(password, &hash).expect("verify should succeed"));
        }
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let h = hasher();
        let hash = h.hash("correct-horse-battery-staple").expect("hashing should succeed");
        assert!(!h.verify("wrong-password", &hash).expect("verify should not error"));
        assert!(!h.verify("", &hash).expect("verify should not error"));
    }

    #[test]
    fn same_password_gets_a_fresh_salt() {
        let h = hasher();
        let a = h.hash("secret1").unwrap();
        let b = h.hash("secret1").unwrap();
        assert_ne!(a, b);
        assert_ne!(a, "secret1");
        assert!(a.starts_with("$argon2id$"));
    }

    #[test]
    fn verifies_hash_made_with_other_cost() {
        let strong = PasswordHasher::new(&PasswordConfig {
            memory_kib: 512,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        let hash = strong.hash("secret1").unwrap();
        assert!(hasher().verify("secret1", &hash).unwrap());
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = hasher().verify("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(hasher().hash("").is_err());
    }

    #[test]
    fn invalid_params_fail_construction() {
        let cfg = PasswordConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 0,
        };
        assert!(PasswordHasher::new(&cfg).is_err());
    }
}
