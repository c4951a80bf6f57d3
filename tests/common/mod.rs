// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
};
use shopwithus::config::{Config, StoreBackend};
use shopwithus::db::{DocumentDb, FileStore};
use shopwithus::routes::create_router;
use shopwithus::services::{AccountService, Participants};
use shopwithus::AppState;
use std::path::PathBuf;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a document store backed by the emulator.
#[allow(dead_code)]
pub async fn test_db() -> DocumentDb {
    DocumentDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Fresh path for a responses file; the file itself is not created.
#[allow(dead_code)]
pub fn temp_responses_file() -> PathBuf {
    std::env::temp_dir().join(format!("shopwithus-test-{}.json", uuid::Uuid::new_v4()))
}

fn test_config(store_backend: StoreBackend) -> Config {
    Config {
        store_backend,
        user_responses_file: temp_responses_file(),
        public_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("public"),
        ..Config::test_default()
    }
}

/// Create a test app with a Prolific-ID file store in a temp file.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = test_config(StoreBackend::File);
    let participants = Participants::File(FileStore::new(&config.user_responses_file));
    let state = Arc::new(AppState {
        config,
        participants,
    });
    (create_router(state.clone()), state)
}

/// Create a test app with username/password accounts in memory.
#[allow(dead_code)]
pub fn create_account_app() -> (axum::Router, Arc<AppState>) {
    let config = test_config(StoreBackend::Memory);
    let participants = Participants::Accounts(AccountService::new(DocumentDb::new_in_memory()));
    let state = Arc::new(AppState {
        config,
        participants,
    });
    (create_router(state.clone()), state)
}

/// GET with an optional session cookie.
#[allow(dead_code)]
pub fn get(uri: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(session) = session {
        builder = builder.header(header::COOKIE, format!("sessionId={session}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// POST a JSON body with an optional session cookie.
#[allow(dead_code)]
pub fn post_json(uri: &str, body: serde_json::Value, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(session) = session {
        builder = builder.header(header::COOKIE, format!("sessionId={session}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// All `Set-Cookie` header values.
#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// The session token set by a login response.
#[allow(dead_code)]
pub fn session_from(response: &Response) -> String {
    let headers = set_cookie_headers(response);
    let cookie = headers
        .iter()
        .find(|value| value.starts_with("sessionId="))
        .unwrap_or_else(|| panic!("missing sessionId cookie: {headers:?}"));
    cookie["sessionId=".len()..]
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

#[allow(dead_code)]
pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[allow(dead_code)]
pub async fn json_body(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
