use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use super::{
    dto::{RegisterRequest, TokenResponse, UserResponse, VerifyEmailQuery},
    errors::AuthError,
    extractors::{AuthUser, Credentials},
    services::{self, is_valid_email},
};
use crate::{
    api::{ApiError, MessageResponse},
    state::AppState,
};

pub const AVATAR_MAX_BYTES: usize = 5 * 1024 * 1024;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/token", post(login))
        .route("/auth/verify-email", get(verify_email))
        .route("/auth/me", get(get_me))
        .route(
            "/auth/upload-avatar",
            // room for multipart framing around the file itself
            post(upload_avatar).layer(DefaultBodyLimit::max(AVATAR_MAX_BYTES + 64 * 1024)),
        )
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::UnprocessableEntity("Invalid email".into()));
    }
    if payload.password.is_empty() {
        return Err(ApiError::UnprocessableEntity("Password must not be empty".into()));
    }

    let user = services::register(&state, &payload.email, &payload.password).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, creds))]
pub async fn login(
    State(state): State<AppState>,
    Credentials(creds): Credentials,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = services::login(&state, &creds.email, &creds.password).await?;
    Ok(Json(TokenResponse::bearer(token)))
}

#[instrument(skip(state, query))]
pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    let token = query
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing verification token".into()))?;

    match services::verify_email(&state, &token).await {
        Ok(()) => Ok(MessageResponse::new("Email verified successfully")),
        Err(AuthError::InvalidToken) => Err(ApiError::BadRequest(
            "Invalid or expired verification token".into(),
        )),
        Err(e) => Err(e.into()),
    }
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = services::current_user(&state, &email)
        .await
        .map_err(stale_session)?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, mp))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
    mut mp: Multipart,
) -> Result<Json<UserResponse>, ApiError> {
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".into());
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        if data.is_empty() {
            return Err(ApiError::UnprocessableEntity("file is empty".into()));
        }
        if data.len() > AVATAR_MAX_BYTES {
            return Err(ApiError::UnprocessableEntity("file is too large".into()));
        }

        let user = services::upload_avatar(&state, &email, data, &content_type)
            .await
            .map_err(stale_session)?;
        return Ok(Json(user.into()));
    }

    Err(ApiError::UnprocessableEntity("file is required".into()))
}

/// A valid token whose user is gone is an authentication failure, not a 404.
fn stale_session(err: AuthError) -> ApiError {
    match err {
        AuthError::UserNotFound => ApiError::Unauthorized("User not found".into()),
        other => other.into(),
    }
}
