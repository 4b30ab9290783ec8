//! API handlers for the Libris endpoints

pub mod admin;
pub mod catalog;
pub mod health;
pub mod openapi;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    AppState,
};

/// Bearer-token claims. Tokens are issued by the surrounding identity
/// service; this server only validates and reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthClaims {
    /// Patron id of the authenticated user
    pub sub: i32,
    pub username: String,
    #[serde(default)]
    pub role: String,
    pub exp: usize,
}

impl AuthClaims {
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let data = decode::<AuthClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }

    /// Admin-console routes require the librarian role
    pub fn require_librarian(&self) -> AppResult<()> {
        if self.role == "librarian" {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Librarian role required".to_string(),
            ))
        }
    }
}

/// Extractor for the authenticated user from a JWT bearer token
pub struct AuthenticatedUser(pub AuthClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Get the Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        // Check for Bearer token
        if !auth_header.starts_with("Bearer ") {
            return Err(AppError::Authentication("Invalid authorization header format".to_string()));
        }

        let token = &auth_header[7..];

        // Validate JWT token using the secret from configuration
        let claims = AuthClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}
