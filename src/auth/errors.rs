use thiserror::Error;

use super::{jwt::TokenError, password::PasswordError};
use crate::db::RepoError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User with this email already exists")]
    EmailTaken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Could not validate credentials")]
    InvalidToken,
    #[error("User not found")]
    UserNotFound,
    #[error("Unsupported image type: {0}")]
    UnsupportedImage(String),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("token signing failed: {0}")]
    Signing(String),
    #[error("avatar upload failed: {0}")]
    Storage(anyhow::Error),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => AuthError::InvalidToken,
            TokenError::Signing(e) => AuthError::Signing(e.to_string()),
        }
    }
}
