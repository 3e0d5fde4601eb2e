use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::User;
use crate::db::RepoError;

const USER_COLUMNS: &str = "id, email, password_hash, is_verified, avatar_url";

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Exact, case-sensitive match.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Fails with `RepoError::Duplicate` when the email is taken.
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, RepoError>;

    /// Returns `false` when no user has this email. Already-verified users
    /// report `true`.
    async fn mark_verified(&self, email: &str) -> Result<bool, RepoError>;

    async fn set_avatar(&self, user_id: Uuid, url: &str) -> Result<Option<User>, RepoError>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn create(&self, email: &str, password_hash: &str) -> Result<User, RepoError> {
        let sql = format!(
            "INSERT INTO users (id, email, password_hash) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.db)
            .await
            .map_err(RepoError::from_insert)
    }

    async fn mark_verified(&self, email: &str) -> Result<bool, RepoError> {
        let res = sqlx::query("UPDATE users SET is_verified = TRUE WHERE email = $1")
            .bind(email)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn set_avatar(&self, user_id: Uuid, url: &str) -> Result<Option<User>, RepoError> {
        let sql = format!("UPDATE users SET avatar_url = $2 WHERE id = $1 RETURNING {USER_COLUMNS}");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .bind(url)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }
}
