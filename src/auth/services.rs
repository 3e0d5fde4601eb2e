use bytes::Bytes;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};

use super::{
    claims::TokenPurpose,
    errors::AuthError,
    password::{hash_password, verify_password},
    repo_types::User,
};
use crate::{db::RepoError, state::AppState, storage::ext_from_mime};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub async fn find_by_email(state: &AppState, email: &str) -> Result<Option<User>, AuthError> {
    Ok(state.users.find_by_email(email).await?)
}

/// Creates an unverified user and queues the verification email. The caller
/// gets the user back whatever happens to the mail.
pub async fn register(state: &AppState, email: &str, password: &str) -> Result<User, AuthError> {
    if find_by_email(state, email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AuthError::EmailTaken);
    }

    let hash = hash_password(password)?;
    let user = match state.users.create(email, &hash).await {
        Ok(u) => u,
        Err(RepoError::Duplicate) => {
            warn!(email = %email, "email registered concurrently");
            return Err(AuthError::EmailTaken);
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    send_verification_email(state, &user.email);
    Ok(user)
}

/// Fire-and-forget: failures are logged, never retried or reported.
fn send_verification_email(state: &AppState, email: &str) {
    let token = match state.jwt.sign_email_verification(email) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, email = %email, "could not sign verification token");
            return;
        }
    };
    let link = format!(
        "{}/auth/verify-email?token={}",
        state.config.base_url.trim_end_matches('/'),
        token
    );

    let mailer = state.mailer.clone();
    let to = email.to_string();
    tokio::spawn(async move {
        if let Err(e) = mailer.send_verification(&to, &link).await {
            error!(error = %e, to = %to, "failed to send verification email");
        }
    });
}

/// Checks credentials and issues a session token.
pub async fn login(state: &AppState, email: &str, password: &str) -> Result<String, AuthError> {
    let user = match find_by_email(state, email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(AuthError::InvalidCredentials);
        }
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(AuthError::InvalidCredentials);
    }

    let token = state.jwt.sign_access(&user.email)?;
    info!(user_id = %user.id, "user logged in");
    Ok(token)
}

/// Marks the token's subject as verified. Repeating it is harmless.
pub async fn verify_email(state: &AppState, token: &str) -> Result<(), AuthError> {
    let claims = state
        .jwt
        .decode_for(token, TokenPurpose::EmailVerification)?;

    if !state.users.mark_verified(&claims.sub).await? {
        warn!(email = %claims.sub, "verification for unknown user");
        return Err(AuthError::UserNotFound);
    }
    info!(email = %claims.sub, "email verified");
    Ok(())
}

pub async fn current_user(state: &AppState, email: &str) -> Result<User, AuthError> {
    find_by_email(state, email)
        .await?
        .ok_or(AuthError::UserNotFound)
}

/// Uploads the image to the host and stores its public URL on the user,
/// replacing any earlier avatar.
pub async fn upload_avatar(
    state: &AppState,
    email: &str,
    body: Bytes,
    content_type: &str,
) -> Result<User, AuthError> {
    let ext = ext_from_mime(content_type)
        .ok_or_else(|| AuthError::UnsupportedImage(content_type.to_string()))?;
    let user = current_user(state, email).await?;

    let key = format!("avatars/{}.{}", user.id, ext);
    state
        .storage
        .put_object(&key, body, content_type)
        .await
        .map_err(AuthError::Storage)?;
    let url = state.storage.public_url(&key);

    let user = state
        .users
        .set_avatar(user.id, &url)
        .await?
        .ok_or(AuthError::UserNotFound)?;
    info!(user_id = %user.id, url = %url, "avatar updated");
    Ok(user)
}
