use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    /// `None` issues tokens without an `exp` claim.
    pub ttl_minutes: Option<i64>,
}

/// Argon2 cost parameters used for every new password hash.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let ttl_minutes = env_parse::<i64>("JWT_TTL_MINUTES").unwrap_or(60 * 24 * 7);
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "accounts".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "accounts-users".into()),
            ttl_minutes: (ttl_minutes > 0).then_some(ttl_minutes),
        };
        let defaults = PasswordConfig::default();
        let password = PasswordConfig {
            memory_kib: env_parse("PASSWORD_MEMORY_KIB").unwrap_or(defaults.memory_kib),
            iterations: env_parse("PASSWORD_ITERATIONS").unwrap_or(defaults.iterations),
            parallelism: env_parse("PASSWORD_PARALLELISM").unwrap_or(defaults.parallelism),
        };
        Ok(Self {
            database_url,
            jwt,
            password,
        })
    }
}
