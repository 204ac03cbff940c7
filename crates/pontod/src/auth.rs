//! Bearer-token authentication.
//!
//! A single static credential is exchanged at `POST /auth/login` for an
//! HS256 JWT valid for twelve hours. Every other non-public route requires
//! `Authorization: Bearer <token>`.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Form, Json,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::error::ErrorResponse;
use crate::state::AppState;

/// Fixed token lifetime.
pub const TOKEN_TTL_HOURS: i64 = 12;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("missing bearer token")]
    MissingToken,
    #[error("token expired")]
    TokenExpired,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("token signing failed: {0}")]
    Signing(String),
}

impl AuthError {
    fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::MissingToken => "UNAUTHORIZED",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
            AuthError::Signing(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        };
        let body = ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: None,
        };
        (status, Json(body)).into_response()
    }
}

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// The static credential and signing key.
pub struct AuthConfig {
    username: String,
    password_digest: [u8; 32],
    secret: String,
}

impl AuthConfig {
    pub fn new(username: impl Into<String>, password: &str, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_digest: digest(password),
            secret: secret.into(),
        }
    }

    /// Compare against the configured credential by SHA-256 digest.
    pub fn check_credentials(&self, username: &str, password: &str) -> bool {
        let user_ok = digest(username) == digest(&self.username);
        let pass_ok = digest(password) == self.password_digest;
        user_ok & pass_ok
    }

    pub fn issue_token(&self, subject: &str) -> Result<String, AuthError> {
        self.issue_token_at(subject, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_token_at(&self, subject: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::Signing(e.to_string()))
    }

    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &DecodingKey::from_secret(self.secret.as_bytes()), &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, AuthError> {
    if !state.auth.check_credentials(&form.username, &form.password) {
        tracing::warn!(username = %form.username, "login rejected");
        return Err(AuthError::InvalidCredentials);
    }
    let access_token = state.auth.issue_token(&form.username)?;
    tracing::info!(username = %form.username, "token issued");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// Reject requests without a valid, unexpired bearer token.
pub async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(request.headers()).ok_or(AuthError::MissingToken)?;
    let claims = state.auth.validate(token)?;
    tracing::trace!(sub = %claims.sub, "request authorized");
    Ok(next.run(request).await)
}

/// Token from `Authorization: Bearer <token>`; the scheme matches in any case.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig::new("admin", "admin123", "test-secret")
    }

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        for value in ["Bearer abc", "bearer abc", "BEARER  abc "] {
            headers.insert(AUTHORIZATION, value.parse().unwrap());
            assert_eq!(bearer_token(&headers), Some("abc"), "{value}");
        }
        for value in ["Basic abc", "Bearer", "Bearer   ", "abc"] {
            headers.insert(AUTHORIZATION, value.parse().unwrap());
            assert_eq!(bearer_token(&headers), None, "{value}");
        }
    }

    #[test]
    fn test_check_credentials() {
        let auth = config();
        assert!(auth.check_credentials("admin", "admin123"));
        assert!(!auth.check_credentials("admin", "admin124"));
        assert!(!auth.check_credentials("root", "admin123"));
    }

    #[test]
    fn test_token_roundtrip_has_twelve_hour_expiry() {
        let auth = config();
        let token = auth.issue_token("admin").unwrap();
        let claims = auth.validate(&token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.exp - claims.iat, 12 * 3600);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let auth = config();
        let token = auth
            .issue_token_at("admin", Utc::now() - Duration::hours(13))
            .unwrap();
        assert!(matches!(auth.validate(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let other = AuthConfig::new("admin", "admin123", "another-secret");
        let token = other.issue_token("admin").unwrap();
        assert!(matches!(config().validate(&token), Err(AuthError::InvalidToken(_))));
    }
}
