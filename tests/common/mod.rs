#![allow(dead_code)]

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::Serialize;
use siam_portal::{AppConfig, AppState, MockBackendApi, api::ApiState, create_router};
use std::sync::Arc;
use tokio::net::TcpListener;

pub const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";

#[derive(Serialize)]
struct TokenClaims<'a> {
    sub: &'a str,
    role: &'a str,
    exp: i64,
    iat: i64,
    email: &'a str,
}

pub fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

/// A real HS256 token, the same shape the backend login issues.
/// `exp_offset` is relative to now, in seconds (negative for expired tokens).
pub fn create_token(sub: &str, role: &str, exp_offset: i64) -> String {
    let now = now_secs();
    let claims = TokenClaims {
        sub,
        role,
        exp: now + exp_offset,
        iat: now,
        email: "someone@example.com",
    };

    let key = EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

/// A token whose payload segment is exactly `payload`, base64url-encoded.
pub fn token_with_payload(payload: &str) -> String {
    format!(
        "eyJhbGciOiJIUzI1NiJ9.{}.c2lnbmF0dXJl",
        URL_SAFE_NO_PAD.encode(payload.as_bytes())
    )
}

/// A token whose payload segment is used verbatim.
pub fn token_with_raw_segment(segment: &str) -> String {
    format!("eyJhbGciOiJIUzI1NiJ9.{segment}.c2lnbmF0dXJl")
}

/// Spawns the gateway on an ephemeral port and returns its base address.
pub async fn spawn_gateway(api: MockBackendApi) -> String {
    spawn_gateway_with(Arc::new(api)).await
}

pub async fn spawn_gateway_with(api: ApiState) -> String {
    let state = AppState {
        api,
        config: AppConfig::default(),
    };
    spawn_router(create_router(state)).await
}

/// Serves `router` on an ephemeral port and returns its base address.
pub async fn spawn_router(router: axum::Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

/// A client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
