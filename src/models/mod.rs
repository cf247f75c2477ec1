//! Data models for the AssetCert authentication service

pub mod auth;

pub use auth::*;

use serde::{Deserialize, Serialize};

/// Role granted to an authenticated wallet.
///
/// Roles are derived from the configured wallet whitelists: every wallet can
/// authenticate as a submitter, the backoffice surface requires reviewer or
/// admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Submitter,
    Reviewer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Submitter => "submitter",
            Role::Reviewer => "reviewer",
            Role::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "submitter" => Some(Role::Submitter),
            "reviewer" => Some(Role::Reviewer),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Whether this role may log in on the backoffice surface.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::Reviewer | Role::Admin)
    }

    /// Static permission set attached to the session response.
    pub fn permissions(&self) -> &'static [&'static str] {
        match self {
            Role::Submitter => &["submissions:create", "submissions:read"],
            Role::Reviewer => &[
                "submissions:read",
                "reviews:create",
                "reviews:read",
                "certificates:issue",
            ],
            Role::Admin => &[
                "submissions:read",
                "reviews:create",
                "reviews:read",
                "certificates:issue",
                "users:manage",
                "platform:admin",
            ],
        }
    }
}
