//! API handlers for the AssetCert auth service

pub mod auth;

pub use auth::*;
