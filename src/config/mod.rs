//! Configuration management
//!
//! Loads and validates configuration from environment variables, with
//! support for different environments (development, staging, production).

use std::env;

use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid environment value: {0}")]
    InvalidValue(String),

    #[error("Invalid port number: {0}")]
    InvalidPort(String),
}

/// Application environment
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue(format!(
                "Invalid environment: '{}'. Expected: dev, staging, or prod",
                s
            ))),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

/// Stellar network selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StellarNetwork {
    #[default]
    Testnet,
    Public,
}

impl StellarNetwork {
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "testnet" | "test" => Ok(StellarNetwork::Testnet),
            "public" | "mainnet" => Ok(StellarNetwork::Public),
            _ => Err(ConfigError::InvalidValue(format!(
                "Invalid Stellar network: '{}'. Expected: testnet or public",
                s
            ))),
        }
    }

    pub fn passphrase(&self) -> &'static str {
        match self {
            StellarNetwork::Testnet => "Test SDF Network ; September 2015",
            StellarNetwork::Public => "Public Global Stellar Network ; September 2015",
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Current environment
    pub environment: Environment,

    /// Server port
    pub port: u16,

    /// Stellar network the challenge transactions target
    pub network: StellarNetwork,

    /// JWT secret for session token signing
    pub jwt_secret: String,

    /// Session token TTL in seconds (default: 3600)
    pub session_token_ttl_seconds: i64,

    /// Login challenge TTL in seconds (default: 300 = 5 minutes)
    pub challenge_ttl_seconds: i64,

    /// Wallets granted the admin role
    pub admin_wallets: Vec<String>,

    /// Wallets granted the reviewer role
    pub reviewer_wallets: Vec<String>,

    /// Accept mock signatures (test/demo wallets). Never honored in
    /// production regardless of the environment variable.
    pub allow_mock_signatures: bool,

    /// Rate limit: requests per second per IP
    pub rate_limit_rps: u32,

    /// CORS allowed origins
    pub cors_allowed_origins: Option<String>,

    /// Log level (RUST_LOG)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .map(|s| Environment::from_str(&s))
            .unwrap_or(Ok(Environment::Development))?;

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort("PORT must be a valid number".to_string()))?;

        let network = env::var("STELLAR_NETWORK")
            .map(|s| StellarNetwork::from_str(&s))
            .unwrap_or(Ok(StellarNetwork::Testnet))?;

        let jwt_secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| "development-secret-change-in-production".to_string());

        let session_token_ttl_seconds = env::var("SESSION_TOKEN_TTL_SECONDS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse::<i64>()
            .unwrap_or(3600);

        let challenge_ttl_seconds = env::var("AUTH_CHALLENGE_TTL_SECONDS")
            .unwrap_or_else(|_| "300".to_string())
            .parse::<i64>()
            .unwrap_or(300);

        let admin_wallets = parse_wallet_list(&env::var("ADMIN_WALLETS").unwrap_or_default());
        let reviewer_wallets =
            parse_wallet_list(&env::var("REVIEWER_WALLETS").unwrap_or_default());

        let mock_requested = env::var("ALLOW_MOCK_SIGNATURES")
            .map(|s| s == "1" || s.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let allow_mock_signatures = mock_requested && !environment.is_production();
        if mock_requested && environment.is_production() {
            tracing::warn!("ALLOW_MOCK_SIGNATURES is ignored in production");
        }

        let rate_limit_rps = env::var("RATE_LIMIT_RPS")
            .unwrap_or_else(|_| "100".to_string())
            .parse::<u32>()
            .unwrap_or(100);

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS").ok();

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Config {
            environment,
            port,
            network,
            jwt_secret,
            session_token_ttl_seconds,
            challenge_ttl_seconds,
            admin_wallets,
            reviewer_wallets,
            allow_mock_signatures,
            rate_limit_rps,
            cors_allowed_origins,
            log_level,
        })
    }
}

/// Parse a comma-separated wallet list from an environment variable.
fn parse_wallet_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
