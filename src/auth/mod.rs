//! Authentication for the AssetCert platform
//!
//! Wallet-based challenge-response login:
//! - challenges embedded in Stellar transactions as `auth_challenge`
//!   ManageData entries
//! - structural verification of the signed envelope (prefix match, source
//!   account, expiry)
//! - stateless JWT sessions

pub mod challenge_tx;
pub mod jwt;
pub mod store;
pub mod strkey;

mod service;

pub use jwt::{verify_token, Claims};
pub use service::{AuthError, AuthService, AuthSurface};
pub use store::ChallengeStore;
