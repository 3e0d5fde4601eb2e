use std::sync::Arc;

use tracing::info;

use crate::{
    auth::{
        jwt::JwtKeys,
        repo::{PgUserRepository, UserRepository},
    },
    config::AppConfig,
    contacts::repo::{ContactRepository, PgContactRepository},
    db,
    mail::{Mailer, SmtpMailer},
    rate_limit::{RateLimiter, WINDOW},
    storage::{Storage, StorageClient},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub users: Arc<dyn UserRepository>,
    pub contacts: Arc<dyn ContactRepository>,
    pub mailer: Arc<dyn Mailer>,
    pub storage: Arc<dyn StorageClient>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Connects every collaborator named in the config and runs migrations.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let pool = db::connect(&config.database_url).await?;
        db::migrate(&pool).await?;
        info!("database ready");

        let mailer = Arc::new(SmtpMailer::new(&config.mail)?) as Arc<dyn Mailer>;
        let storage = Arc::new(Storage::new(&config.storage).await?) as Arc<dyn StorageClient>;

        Ok(Self::from_parts(
            config,
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgContactRepository::new(pool)),
            mailer,
            storage,
        ))
    }

    pub fn from_parts(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        contacts: Arc<dyn ContactRepository>,
        mailer: Arc<dyn Mailer>,
        storage: Arc<dyn StorageClient>,
    ) -> Self {
        let jwt = JwtKeys::from(&config.jwt);
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit_per_minute, WINDOW));
        Self {
            config: Arc::new(config),
            jwt,
            users,
            contacts,
            mailer,
            storage,
            rate_limiter,
        }
    }
}
