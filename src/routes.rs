//! Route definitions for the AssetCert auth API

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{get_session, request_challenge, verify_signature, wallet_login};
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/challenge", post(request_challenge))
        .route("/api/auth/verify", post(verify_signature))
        .route("/api/auth/wallet-login", post(wallet_login))
        .route("/api/auth/me", get(get_session))
}
