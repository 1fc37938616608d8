use anyhow::Context;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use super::claims::Claims;
use crate::{config::JwtConfig, error::AppError};

/// HS256 signing and verification keys with the claim settings they check.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Option<TimeDuration>,
}

impl TokenSigner {
    /// Fails when the configured lifetime would push `exp` past the range
    /// of a timestamp.
    pub fn new(cfg: &JwtConfig) -> anyhow::Result<Self> {
        let ttl = match cfg.ttl_minutes.filter(|m| *m > 0) {
            None => None,
            Some(minutes) => {
                let ttl = minutes
                    .checked_mul(60)
                    .map(TimeDuration::seconds)
                    .with_context(|| format!("token lifetime of {minutes} minutes overflows"))?;
                OffsetDateTime::now_utc()
                    .checked_add(ttl)
                    .with_context(|| format!("token lifetime of {minutes} minutes is out of range"))?;
                Some(ttl)
            }
        };
        Ok(Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl,
        })
    }

    pub fn issue(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = match self.ttl {
            None => None,
            Some(ttl) => {
                let exp = now.checked_add(ttl).context("token expiry out of range")?;
                Some(exp.unix_timestamp() as usize)
            }
        };
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, expires = exp.is_some(), "jwt signed");
        Ok(token)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        if self.ttl.is_none() {
            validation.required_spec_claims.remove("exp");
            validation.validate_exp = false;
        }
        validation
    }

    /// Any decode failure yields the same error and log line; the reason is
    /// never surfaced.
    pub fn validate(&self, token: &str) -> Result<Uuid, AppError> {
        match decode::<Claims>(token, &self.decoding, &self.validation()) {
            Ok(data) => {
                debug!(user_id = %data.claims.sub, "jwt verified");
                Ok(data.claims.sub)
            }
            Err(_) => {
                warn!("invalid or expired token");
                Err(AppError::InvalidToken)
            }
        }
    }
}
