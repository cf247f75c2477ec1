//! Session extraction middleware
//!
//! Verifies the bearer token from the Authorization header and exposes the
//! authenticated wallet to handlers. Sessions are stateless, so there is no
//! revocation lookup; an unexpired, well-signed token is accepted.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::auth::jwt::JwtError;
use crate::auth::{verify_token, AuthService};
use crate::error::ApiError;
use crate::models::Role;

/// Authenticated wallet extracted from the session token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub wallet_address: String,
    pub role: Role,
    pub jti: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    ApiError::Unauthorized(
                        "Authorization header with Bearer token required".to_string(),
                    )
                })?;

        let auth_service = Arc::<AuthService>::from_ref(state);

        let claims = verify_token(bearer.token(), auth_service.jwt_secret()).map_err(|e| {
            match e {
                JwtError::TokenExpired => ApiError::Unauthorized("Token has expired".to_string()),
                _ => ApiError::Unauthorized("Invalid token".to_string()),
            }
        })?;

        if claims.token_type != "access" {
            return Err(ApiError::Unauthorized("Invalid token type".to_string()));
        }

        let role = Role::from_str(&claims.role)
            .ok_or_else(|| ApiError::Unauthorized("Invalid role in token".to_string()))?;

        Ok(AuthenticatedUser {
            wallet_address: claims.sub,
            role,
            jti: claims.jti,
        })
    }
}
