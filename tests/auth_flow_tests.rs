//! End-to-end authentication flow tests
//!
//! Exercises the full login cycle over the HTTP surface: challenge
//! issuance, signed-envelope verification, session minting, and session
//! introspection.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use assetcert_auth::auth::{strkey, AuthService};
use assetcert_auth::routes::auth_routes;
use assetcert_auth::state::AppState;

const WALLET: &str = "GAAZI4TCR3TY5OJHCTJC2A4QSY6CJWJH5IAJTGKIN2ER7LBNVKOCCWN7";
const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";

fn test_app(admin_wallets: Vec<String>, allow_mock: bool) -> Router {
    let auth_service = Arc::new(AuthService::new(
        "integration-test-secret".to_string(),
        3600,
        300,
        TESTNET_PASSPHRASE.to_string(),
        admin_wallets,
        vec![],
        allow_mock,
    ));
    auth_routes().with_state(AppState::new(auth_service))
}

async fn post_json(
    app: &Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn get_with_token(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_public_login_full_cycle() {
    let app = test_app(vec![], false);

    // 1. Request a challenge
    let (status, challenge) = post_json(
        &app,
        "/api/auth/challenge",
        serde_json::json!({ "wallet_address": WALLET }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(challenge["network_passphrase"], TESTNET_PASSPHRASE);
    assert!(!challenge["message"].as_str().unwrap().is_empty());

    let challenge_value = challenge["challenge"].as_str().unwrap().to_string();
    // The unsigned envelope stands in for the signed one: signature bytes
    // are not checked server-side.
    let envelope = challenge["transaction"].as_str().unwrap().to_string();

    // 2. Submit the "signed" transaction
    let (status, session) = post_json(
        &app,
        "/api/auth/wallet-login",
        serde_json::json!({
            "wallet_address": WALLET,
            "signature": envelope,
            "challenge": challenge_value,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["success"], true);
    assert_eq!(session["user"]["wallet_address"], WALLET);
    assert_eq!(session["user"]["role"], "submitter");
    let token = session["token"].as_str().unwrap().to_string();
    assert!(!token.is_empty());

    // 3. The challenge is single-use
    let (status, body) = post_json(
        &app,
        "/api/auth/wallet-login",
        serde_json::json!({
            "wallet_address": WALLET,
            "signature": envelope,
            "challenge": challenge_value,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    // 4. The issued token introspects
    let (status, me) = get_with_token(&app, "/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["wallet_address"], WALLET);
    assert_eq!(me["role"], "submitter");
    assert!(me["permissions"].as_array().unwrap().len() > 0);
}

#[tokio::test]
async fn test_challenge_rejects_invalid_wallet() {
    let app = test_app(vec![], false);

    let (status, body) = post_json(
        &app,
        "/api/auth/challenge",
        serde_json::json!({ "wallet_address": "" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["code"].is_string());

    let (status, _) = post_json(
        &app,
        "/api/auth/challenge",
        serde_json::json!({ "wallet_address": "not-a-stellar-address" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_backoffice_verify_requires_whitelisted_wallet() {
    // Non-whitelisted wallet: verification succeeds but login is forbidden
    let app = test_app(vec![], false);
    let (_, challenge) = post_json(
        &app,
        "/api/auth/challenge",
        serde_json::json!({ "wallet_address": WALLET }),
    )
    .await;
    let (status, body) = post_json(
        &app,
        "/api/auth/verify",
        serde_json::json!({
            "wallet_address": WALLET,
            "signature": challenge["transaction"],
            "challenge": challenge["challenge"],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    // Whitelisted wallet gets an admin session with permissions
    let app = test_app(vec![WALLET.to_string()], false);
    let (_, challenge) = post_json(
        &app,
        "/api/auth/challenge",
        serde_json::json!({ "wallet_address": WALLET }),
    )
    .await;
    let (status, session) = post_json(
        &app,
        "/api/auth/verify",
        serde_json::json!({
            "wallet_address": WALLET,
            "signature": challenge["transaction"],
            "challenge": challenge["challenge"],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["role"], "admin");
    assert_eq!(session["wallet_address"], WALLET);
    assert!(session["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p == "platform:admin"));
}

#[tokio::test]
async fn test_verify_rejects_envelope_issued_to_other_wallet() {
    let app = test_app(vec![], false);
    let other_wallet = strkey::encode_account_id(&[3u8; 32]);

    let (_, challenge) = post_json(
        &app,
        "/api/auth/challenge",
        serde_json::json!({ "wallet_address": WALLET }),
    )
    .await;
    // A challenge issued to another wallet yields an envelope with the
    // wrong source account
    let (_, foreign) = post_json(
        &app,
        "/api/auth/challenge",
        serde_json::json!({ "wallet_address": other_wallet }),
    )
    .await;

    let (status, _) = post_json(
        &app,
        "/api/auth/wallet-login",
        serde_json::json!({
            "wallet_address": WALLET,
            "signature": foreign["transaction"],
            "challenge": challenge["challenge"],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_mock_signature_login_when_enabled() {
    let app = test_app(vec![], true);

    let (_, challenge) = post_json(
        &app,
        "/api/auth/challenge",
        serde_json::json!({ "wallet_address": WALLET }),
    )
    .await;

    let (status, session) = post_json(
        &app,
        "/api/auth/wallet-login",
        serde_json::json!({
            "wallet_address": WALLET,
            "signature": "mock_signature_for_testing",
            "challenge": challenge["challenge"],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["success"], true);

    // Even the mock path consumes the challenge
    let (status, _) = post_json(
        &app,
        "/api/auth/wallet-login",
        serde_json::json!({
            "wallet_address": WALLET,
            "signature": "mock_signature_for_testing",
            "challenge": challenge["challenge"],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_backoffice_verify_rejects_mock_signature() {
    // Mock signatures enabled and the wallet admin-whitelisted: the public
    // surface would accept this, the backoffice must not.
    let app = test_app(vec![WALLET.to_string()], true);

    let (_, challenge) = post_json(
        &app,
        "/api/auth/challenge",
        serde_json::json!({ "wallet_address": WALLET }),
    )
    .await;

    let (status, body) = post_json(
        &app,
        "/api/auth/verify",
        serde_json::json!({
            "wallet_address": WALLET,
            "signature": "mock_signature_for_testing",
            "challenge": challenge["challenge"],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    // The challenge survives, so a real envelope still logs in
    let (status, session) = post_json(
        &app,
        "/api/auth/verify",
        serde_json::json!({
            "wallet_address": WALLET,
            "signature": challenge["transaction"],
            "challenge": challenge["challenge"],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["role"], "admin");
}

#[tokio::test]
async fn test_mock_signature_rejected_when_disabled() {
    let app = test_app(vec![], false);

    let (_, challenge) = post_json(
        &app,
        "/api/auth/challenge",
        serde_json::json!({ "wallet_address": WALLET }),
    )
    .await;

    let (status, _) = post_json(
        &app,
        "/api/auth/wallet-login",
        serde_json::json!({
            "wallet_address": WALLET,
            "signature": "mock_signature_for_testing",
            "challenge": challenge["challenge"],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_requires_bearer_token() {
    let app = test_app(vec![], false);

    let (status, _) = get_with_token(&app, "/api/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get_with_token(&app, "/api/auth/me", Some("garbage-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
