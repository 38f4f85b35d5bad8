#![allow(dead_code)]

use fake::Fake;
use serde_json::json;
use std::sync::Arc;
use ufdl::auth::Tokens;
use ufdl::tokenstore::{MemoryTokenStorage, TokenStorage};
use ufdl::{Connection, ServerUrl, Username};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub type AnyResult = Result<(), Box<dyn std::error::Error>>;

pub const PASSWORD: &str = "correct horse battery staple";

pub fn random_username() -> Username {
    Username::new(fake::faker::internet::en::Username().fake::<String>())
}

pub fn server_url(server: &MockServer) -> ServerUrl {
    ServerUrl::new(server.uri()).unwrap()
}

/// Storage which already holds the tokens `("a0", "r0")`.
pub fn seeded_storage(server: &MockServer, username: &Username) -> Arc<MemoryTokenStorage> {
    seeded_storage_at(&server_url(server), username)
}

pub fn seeded_storage_at(url: &ServerUrl, username: &Username) -> Arc<MemoryTokenStorage> {
    let storage = Arc::new(MemoryTokenStorage::new());
    storage
        .store(url, username, &Tokens::new("a0", "r0"))
        .unwrap();
    storage
}

pub fn connect(
    server: &MockServer,
    username: &Username,
    storage: Arc<dyn TokenStorage>,
) -> Connection {
    Connection::build(server_url(server), username.clone(), PASSWORD)
        .token_storage(storage)
        .build()
        .unwrap()
}

/// A connection whose first request is sent with `Bearer a0`.
pub fn seeded_connection(server: &MockServer) -> Connection {
    let username = random_username();
    let storage = seeded_storage(server, &username);
    connect(server, &username, storage)
}

/// Expect the credentials of `username` to be exchanged for `(access, refresh)`.
pub async fn mock_obtain(
    server: &MockServer,
    username: &Username,
    access: &str,
    refresh: &str,
    times: u64,
) {
    Mock::given(method("POST"))
        .and(path("/v1/auth/obtain/"))
        .and(body_json(json!({"username": username, "password": PASSWORD})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": access, "refresh": refresh})),
        )
        .expect(times)
        .mount(server)
        .await;
}

/// Expect refresh token `refresh` to be exchanged for a new `access` token.
pub async fn mock_refresh(server: &MockServer, refresh: &str, access: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/v1/auth/refresh/"))
        .and(body_json(json!({ "refresh": refresh })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": access })))
        .expect(times)
        .mount(server)
        .await;
}
