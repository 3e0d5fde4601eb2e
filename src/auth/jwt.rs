use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use super::claims::{Claims, TokenPurpose};
use crate::{config::JwtConfig, state::AppState};

#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad signature, malformed payload, expired, or wrong purpose. Callers
    /// never learn which.
    #[error("invalid or expired token")]
    Invalid,
    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// Signs and validates bearer tokens with the server secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    issuer: String,
    audience: String,
    access_ttl: Duration,
    email_ttl: Duration,
}

impl From<&JwtConfig> for JwtKeys {
    fn from(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            algorithm: cfg.algorithm,
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            access_ttl: Duration::minutes(cfg.access_ttl_minutes),
            email_ttl: Duration::minutes(cfg.email_ttl_minutes),
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

impl JwtKeys {
    pub fn issue(
        &self,
        subject: &str,
        purpose: TokenPurpose,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc();
        let exp = now + ttl;
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.unix_timestamp().max(0) as usize,
            exp: exp.unix_timestamp().max(0) as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            purpose,
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(TokenError::Signing)?;
        debug!(purpose = ?purpose, "jwt signed");
        Ok(token)
    }

    pub fn sign_access(&self, email: &str) -> Result<String, TokenError> {
        self.issue(email, TokenPurpose::Access, self.access_ttl)
    }

    pub fn sign_email_verification(&self, email: &str) -> Result<String, TokenError> {
        self.issue(email, TokenPurpose::EmailVerification, self.email_ttl)
    }

    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "jwt rejected");
            TokenError::Invalid
        })?;
        if data.claims.sub.trim().is_empty() {
            debug!("jwt rejected: empty subject");
            return Err(TokenError::Invalid);
        }
        Ok(data.claims)
    }

    /// Decodes and additionally requires the given purpose.
    pub fn decode_for(&self, token: &str, purpose: TokenPurpose) -> Result<Claims, TokenError> {
        let claims = self.decode(token)?;
        if claims.purpose != purpose {
            debug!(expected = ?purpose, got = ?claims.purpose, "jwt rejected: wrong purpose");
            return Err(TokenError::Invalid);
        }
        Ok(claims)
    }
}
