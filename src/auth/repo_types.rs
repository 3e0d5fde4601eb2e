use sqlx::FromRow;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,              // lookup key, matched exactly
    pub password_hash: String,      // Argon2 PHC string, never exposed
    pub is_verified: bool,
    pub avatar_url: Option<String>,
}
