//! Authentication DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Role;

/// Request for an authentication challenge
#[derive(Debug, Deserialize, Validate)]
pub struct ChallengeRequest {
    #[validate(length(min = 1, message = "wallet_address is required"))]
    pub wallet_address: String,
}

/// Response containing the authentication challenge and the unsigned
/// challenge transaction the wallet should sign.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChallengeResponse {
    pub challenge: String,
    pub message: String,
    /// Unsigned transaction envelope, base64 XDR.
    pub transaction: String,
    pub network_passphrase: String,
    pub expires_at: DateTime<Utc>,
}

/// Request to verify a signed challenge transaction
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyRequest {
    #[validate(length(min = 1, message = "wallet_address is required"))]
    pub wallet_address: String,
    /// Signed transaction envelope, base64 XDR.
    #[validate(length(min = 1, message = "signature is required"))]
    pub signature: String,
    /// The full (untruncated) challenge echoed back by the client.
    #[validate(length(min = 1, message = "challenge is required"))]
    pub challenge: String,
}

/// Verified session issued by the auth service.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub expires_in: i64,
    pub wallet_address: String,
    pub role: Role,
}

/// Backoffice session response
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub wallet_address: String,
    pub role: Role,
    pub permissions: Vec<String>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            token_type: "Bearer".to_string(),
            expires_in: session.expires_in,
            wallet_address: session.wallet_address,
            permissions: session
                .role
                .permissions()
                .iter()
                .map(|p| p.to_string())
                .collect(),
            role: session.role,
        }
    }
}

/// Public (frontend) login response, OAuth-style token bundle
#[derive(Debug, Serialize, Deserialize)]
pub struct WalletLoginResponse {
    pub success: bool,
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: SessionUser,
}

/// User summary embedded in the login response
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionUser {
    pub wallet_address: String,
    pub role: Role,
}

impl From<Session> for WalletLoginResponse {
    fn from(session: Session) -> Self {
        Self {
            success: true,
            token: session.token,
            token_type: "Bearer".to_string(),
            expires_in: session.expires_in,
            user: SessionUser {
                wallet_address: session.wallet_address,
                role: session.role,
            },
        }
    }
}

/// Session introspection response
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub wallet_address: String,
    pub role: Role,
    pub permissions: Vec<String>,
}
