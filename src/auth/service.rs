//! Authentication service
//!
//! Core business logic for wallet challenge-response authentication:
//! challenge issuance, signed-envelope verification, and session minting.

use std::collections::HashSet;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ChallengeResponse, Role, Session};

use super::challenge_tx::{
    build_challenge_transaction, effective_source_account, embedded_challenge, parse_envelope,
    ChallengeTxError,
};
use super::jwt::generate_session_token;
use super::store::{ChallengeEntry, ChallengeStore};
use super::strkey;

/// Signatures with this prefix take the mock bypass path when enabled.
const MOCK_SIGNATURE_PREFIX: &str = "mock_";

/// Auth service errors
///
/// Everything between `MalformedSignature` and `AccountMismatch` surfaces to
/// clients as a generic 401; the variant only drives server-side logging.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Malformed transaction envelope: {0}")]
    MalformedSignature(String),

    #[error("No auth_challenge entry in transaction")]
    ChallengeNotFound,

    #[error("No challenge issued for wallet")]
    NoChallenge,

    #[error("Challenge expired")]
    ChallengeExpired,

    #[error("Challenge mismatch")]
    ChallengeMismatch,

    #[error("Could not resolve transaction source account")]
    SourceResolution,

    #[error("Transaction source account does not match wallet")]
    AccountMismatch,

    #[error("Wallet not authorized for this surface")]
    NotAuthorized,

    #[error("Internal auth error: {0}")]
    Internal(String),
}

/// Which login surface a verification request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSurface {
    /// Public submission frontend; any wallet may log in.
    Public,
    /// Internal backoffice; requires a reviewer or admin wallet.
    Backoffice,
}

/// Authentication service
pub struct AuthService {
    store: ChallengeStore,
    jwt_secret: String,
    session_ttl_seconds: i64,
    network_passphrase: String,
    admin_wallets: HashSet<String>,
    reviewer_wallets: HashSet<String>,
    mock_signatures_enabled: bool,
}

impl AuthService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        jwt_secret: String,
        session_ttl_seconds: i64,
        challenge_ttl_seconds: i64,
        network_passphrase: String,
        admin_wallets: Vec<String>,
        reviewer_wallets: Vec<String>,
        mock_signatures_enabled: bool,
    ) -> Self {
        Self {
            store: ChallengeStore::new(challenge_ttl_seconds),
            jwt_secret,
            session_ttl_seconds,
            network_passphrase,
            admin_wallets: admin_wallets.into_iter().collect(),
            reviewer_wallets: reviewer_wallets.into_iter().collect(),
            mock_signatures_enabled,
        }
    }

    /// Issue a fresh challenge for a wallet, overwriting any pending one.
    pub async fn issue_challenge(
        &self,
        wallet_address: &str,
    ) -> Result<ChallengeResponse, AuthError> {
        if wallet_address.is_empty() {
            return Err(AuthError::Validation("wallet_address is required".to_string()));
        }
        strkey::decode_account_id(wallet_address)
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        let challenge = generate_challenge();
        let expires_at = Utc::now() + self.store.ttl();
        let message = format!(
            "Sign this transaction to authenticate with AssetCert:\n\nChallenge: {}\nWallet: {}\nExpires: {}",
            challenge,
            wallet_address,
            expires_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        let transaction = build_challenge_transaction(wallet_address, &challenge)
            .map_err(|e| match e {
                ChallengeTxError::InvalidAddress(msg) => AuthError::Validation(msg),
                other => AuthError::Internal(other.to_string()),
            })?;

        self.store.put(wallet_address, challenge.clone()).await;
        tracing::debug!(wallet = %wallet_address, "challenge issued");

        Ok(ChallengeResponse {
            challenge,
            message,
            transaction,
            network_passphrase: self.network_passphrase.clone(),
            expires_at,
        })
    }

    /// Verify a signed challenge transaction and consume the stored
    /// challenge on success.
    ///
    /// This checks structural consistency only: the embedded challenge
    /// prefix, the stored challenge's freshness, and the envelope's
    /// effective source account. Cryptographic signature bytes are the
    /// signing wallet's and the ledger's concern, not ours.
    pub async fn verify_challenge(
        &self,
        wallet_address: &str,
        signature: &str,
        challenge: &str,
    ) -> Result<(), AuthError> {
        if wallet_address.is_empty() || signature.is_empty() || challenge.is_empty() {
            return Err(AuthError::Validation(
                "wallet_address, signature and challenge are required".to_string(),
            ));
        }

        let envelope = parse_envelope(signature).map_err(|e| {
            tracing::debug!(wallet = %wallet_address, error = %e, "envelope parse failed");
            AuthError::MalformedSignature(e.to_string())
        })?;
        let embedded = embedded_challenge(&envelope).ok_or(AuthError::ChallengeNotFound)?;

        let entry = self.checked_entry(wallet_address).await?;
        if entry.challenge != challenge || !entry.challenge.starts_with(&embedded) {
            tracing::debug!(
                wallet = %wallet_address,
                stored_len = entry.challenge.len(),
                embedded_len = embedded.len(),
                "challenge mismatch"
            );
            return Err(AuthError::ChallengeMismatch);
        }

        let source = effective_source_account(&envelope).ok_or(AuthError::SourceResolution)?;
        if source != wallet_address {
            tracing::debug!(wallet = %wallet_address, source = %source, "source account mismatch");
            return Err(AuthError::AccountMismatch);
        }

        // Single-use: the challenge dies with its successful verification.
        self.store.remove(wallet_address).await;
        Ok(())
    }

    /// Full login: verify the signed challenge, enforce the surface's role
    /// requirement, and mint a session token.
    ///
    /// Mock signatures are honored only on the public surface; backoffice
    /// logins always verify the envelope.
    pub async fn authenticate(
        &self,
        wallet_address: &str,
        signature: &str,
        challenge: &str,
        surface: AuthSurface,
    ) -> Result<Session, AuthError> {
        if surface == AuthSurface::Public && self.is_mock_signature(signature) {
            self.consume_mock_challenge(wallet_address, challenge).await?;
        } else {
            self.verify_challenge(wallet_address, signature, challenge)
                .await?;
        }

        let role = self.role_for(wallet_address);
        if surface == AuthSurface::Backoffice && !role.is_elevated() {
            tracing::warn!(wallet = %wallet_address, "backoffice login denied for non-elevated wallet");
            return Err(AuthError::NotAuthorized);
        }

        let jti = Uuid::new_v4().to_string();
        let token = generate_session_token(
            wallet_address,
            role,
            &jti,
            &self.jwt_secret,
            self.session_ttl_seconds,
        )
        .map_err(|e| AuthError::Internal(e.to_string()))?;

        tracing::info!(wallet = %wallet_address, role = %role.as_str(), "wallet authenticated");

        Ok(Session {
            token,
            expires_in: self.session_ttl_seconds,
            wallet_address: wallet_address.to_string(),
            role,
        })
    }

    /// Role derived from the configured whitelists.
    pub fn role_for(&self, wallet_address: &str) -> Role {
        if self.admin_wallets.contains(wallet_address) {
            Role::Admin
        } else if self.reviewer_wallets.contains(wallet_address) {
            Role::Reviewer
        } else {
            Role::Submitter
        }
    }

    /// Sweep expired challenges; returns how many were evicted.
    pub async fn evict_expired_challenges(&self) -> usize {
        self.store.evict_expired().await
    }

    /// Access to the challenge store (for eviction tasks and tests).
    pub fn challenge_store(&self) -> &ChallengeStore {
        &self.store
    }

    /// JWT secret (for middleware access)
    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn network_passphrase(&self) -> &str {
        &self.network_passphrase
    }

    fn is_mock_signature(&self, signature: &str) -> bool {
        self.mock_signatures_enabled && signature.starts_with(MOCK_SIGNATURE_PREFIX)
    }

    /// Mock login path: skips the envelope checks but still requires a
    /// fresh, matching challenge and consumes it.
    async fn consume_mock_challenge(
        &self,
        wallet_address: &str,
        challenge: &str,
    ) -> Result<(), AuthError> {
        tracing::warn!(wallet = %wallet_address, "accepting mock signature (test mode)");
        let entry = self.checked_entry(wallet_address).await?;
        if entry.challenge != challenge {
            return Err(AuthError::ChallengeMismatch);
        }
        self.store.remove(wallet_address).await;
        Ok(())
    }

    async fn checked_entry(&self, wallet_address: &str) -> Result<ChallengeEntry, AuthError> {
        let entry = self
            .store
            .get(wallet_address)
            .await
            .ok_or(AuthError::NoChallenge)?;

        if self.store.is_expired(&entry) {
            self.store.remove(wallet_address).await;
            return Err(AuthError::ChallengeExpired);
        }

        Ok(entry)
    }
}

/// Generate a cryptographically secure random challenge (32 bytes, hex).
fn generate_challenge() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    hex::encode(bytes)
}
