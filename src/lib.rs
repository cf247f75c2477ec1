//! AssetCert Authentication Service Library
//!
//! Wallet challenge-response authentication for the AssetCert real-world
//! asset certification platform.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
