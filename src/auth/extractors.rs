use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequest, FromRequestParts, Request},
    http::{header, request::Parts},
    Form, Json,
};
use tracing::warn;

use super::{claims::TokenPurpose, dto::LoginRequest, jwt::JwtKeys};
use crate::api::ApiError;

/// The caller's email, taken from a valid access token.
///
/// Only proves the token was issued; whether the user still exists is up to
/// the handler or repository.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".into()))?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".into()))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys
            .decode_for(token, TokenPurpose::Access)
            .map_err(|_| {
                warn!("invalid or expired token");
                ApiError::Unauthorized("Could not validate credentials".into())
            })?;

        Ok(AuthUser(claims.sub))
    }
}

/// Login body as JSON or `application/x-www-form-urlencoded`.
pub struct Credentials(pub LoginRequest);

#[async_trait]
impl<S> FromRequest<S> for Credentials
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);

        let body = if is_form {
            let Form(body) = Form::<LoginRequest>::from_request(req, state)
                .await
                .map_err(|e| ApiError::UnprocessableEntity(e.body_text()))?;
            body
        } else {
            let Json(body) = Json::<LoginRequest>::from_request(req, state)
                .await
                .map_err(|e| ApiError::UnprocessableEntity(e.body_text()))?;
            body
        };
        Ok(Credentials(body))
    }
}
