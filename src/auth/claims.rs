use serde::{Deserialize, Serialize};

/// What a token may be used for. Tokens of one purpose are rejected everywhere
/// the other is expected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Access,
    EmailVerification,
}

/// JWT payload shared by session and email-verification tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,            // user email
    pub iat: usize,             // issued at (unix timestamp)
    pub exp: usize,             // expires at (unix timestamp)
    pub iss: String,            // issuer
    pub aud: String,            // audience
    pub purpose: TokenPurpose,
}
