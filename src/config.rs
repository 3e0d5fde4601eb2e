use std::{fmt::Display, str::FromStr};

use anyhow::{bail, Context};
use jsonwebtoken::Algorithm;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub issuer: String,
    pub audience: String,
    pub access_ttl_minutes: i64,
    pub email_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub from_name: String,
    pub starttls: bool,
    pub ssl_tls: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    /// Base URL under which uploaded objects are publicly reachable.
    pub public_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Used to build links in outgoing mail.
    pub base_url: String,
    /// Requests per minute per client; 0 disables limiting.
    pub rate_limit_per_minute: u32,
    pub jwt: JwtConfig,
    pub mail: MailConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source. Missing required keys and
    /// unparsable values are reported with the offending variable name.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let jwt = JwtConfig {
            secret: env.required("JWT_SECRET")?,
            algorithm: parse_algorithm(&env.or("JWT_ALGORITHM", "HS256"))?,
            issuer: env.or("JWT_ISSUER", "contacts-api"),
            audience: env.or("JWT_AUDIENCE", "contacts-api-users"),
            access_ttl_minutes: env.parsed_or("ACCESS_TOKEN_EXPIRE_MINUTES", 30)?,
            email_ttl_minutes: env.parsed_or("EMAIL_TOKEN_EXPIRE_MINUTES", 60)?,
        };
        if jwt.access_ttl_minutes <= 0 || jwt.email_ttl_minutes <= 0 {
            bail!("token expiry minutes must be positive");
        }

        let mail = MailConfig {
            server: env.or("MAIL_SERVER", "smtp.gmail.com"),
            port: env.parsed_or("MAIL_PORT", 587)?,
            username: env.required("MAIL_USERNAME")?,
            password: env.required("MAIL_PASSWORD")?,
            from: env.required("MAIL_FROM")?,
            from_name: env.or("MAIL_FROM_NAME", "Contacts API"),
            starttls: env.parsed_or("MAIL_STARTTLS", true)?,
            ssl_tls: env.parsed_or("MAIL_SSL_TLS", false)?,
        };

        let endpoint = env.required("STORAGE_ENDPOINT")?;
        let bucket = env.required("STORAGE_BUCKET")?;
        let public_url = env
            .optional("STORAGE_PUBLIC_URL")
            .unwrap_or_else(|| format!("{}/{}", endpoint.trim_end_matches('/'), bucket));
        let storage = StorageConfig {
            endpoint,
            bucket,
            access_key: env.required("STORAGE_ACCESS_KEY")?,
            secret_key: env.required("STORAGE_SECRET_KEY")?,
            region: env.or("STORAGE_REGION", "us-east-1"),
            public_url,
        };

        Ok(Self {
            database_url: env.required("DATABASE_URL")?,
            host: env.or("APP_HOST", "0.0.0.0"),
            port: env.parsed_or("APP_PORT", 8080)?,
            base_url: env.or("APP_BASE_URL", "http://localhost:8080"),
            rate_limit_per_minute: env.parsed_or("RATE_LIMIT_PER_MINUTE", 60)?,
            jwt,
            mail,
            storage,
        })
    }
}

/// Only shared-secret algorithms make sense with a single `JWT_SECRET`.
pub fn parse_algorithm(raw: &str) -> anyhow::Result<Algorithm> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => bail!("unsupported JWT_ALGORITHM {other}; expected HS256, HS384 or HS512"),
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &str) -> anyhow::Result<String> {
        self.optional(key)
            .with_context(|| format!("{key} must be set"))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed_or<T>(&self, key: &str, default: T) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.optional(key) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map_err(|e| anyhow::anyhow!("invalid {key}={raw}: {e}")),
            None => Ok(default),
        }
    }
}
