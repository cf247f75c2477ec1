//! Authentication HTTP handlers
//!
//! Endpoints for wallet challenge-response login. The backoffice and public
//! surfaces share the verification logic but differ in role requirements
//! and response shape.

use axum::{extract::State, Json};
use validator::Validate;

use crate::auth::AuthSurface;
use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::models::{
    ChallengeRequest, ChallengeResponse, MeResponse, SessionResponse, VerifyRequest,
    WalletLoginResponse,
};
use crate::state::AppState;

/// POST /api/auth/challenge - Request a login challenge for a wallet
pub async fn request_challenge(
    State(state): State<AppState>,
    Json(req): Json<ChallengeRequest>,
) -> Result<Json<ChallengeResponse>, ApiError> {
    req.validate()?;

    let challenge = state
        .auth_service
        .issue_challenge(&req.wallet_address)
        .await?;

    Ok(Json(challenge))
}

/// POST /api/auth/verify - Verify a signed challenge (backoffice surface)
pub async fn verify_signature(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    req.validate()?;

    let session = state
        .auth_service
        .authenticate(
            &req.wallet_address,
            &req.signature,
            &req.challenge,
            AuthSurface::Backoffice,
        )
        .await?;

    Ok(Json(session.into()))
}

/// POST /api/auth/wallet-login - Verify a signed challenge (public surface)
pub async fn wallet_login(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<WalletLoginResponse>, ApiError> {
    req.validate()?;

    let session = state
        .auth_service
        .authenticate(
            &req.wallet_address,
            &req.signature,
            &req.challenge,
            AuthSurface::Public,
        )
        .await?;

    Ok(Json(session.into()))
}

/// GET /api/auth/me - Introspect the current session
pub async fn get_session(user: AuthenticatedUser) -> Json<MeResponse> {
    Json(MeResponse {
        wallet_address: user.wallet_address,
        role: user.role,
        permissions: user
            .role
            .permissions()
            .iter()
            .map(|p| p.to_string())
            .collect(),
    })
}
