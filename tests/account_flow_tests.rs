// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Username/password accounts against the in-memory document store.

use axum::http::StatusCode;
use serde_json::json;
use shopwithus::models::ConsentKind;
use shopwithus::services::Participants;
use tower::ServiceExt;

mod common;
use common::{get, json_body, post_json, session_from};

async fn signup(app: &axum::Router, username: &str, password: &str) -> StatusCode {
    app.clone()
        .oneshot(post_json(
            "/signup",
            json!({
                "name": "Test User",
                "username": username,
                "password": password,
                "confirmPassword": password,
            }),
            None,
        ))
        .await
        .unwrap()
        .status()
}

async fn login(app: &axum::Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_json(
            "/login",
            json!({ "username": username, "password": password }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    session_from(&response)
}

#[tokio::test]
async fn test_signup_and_login() {
    let (app, _) = common::create_account_app();

    assert_eq!(signup(&app, "alice", "hunter2").await, StatusCode::CREATED);
    let session = login(&app, "alice", "hunter2").await;

    let response = app
        .clone()
        .oneshot(get("/user-info", Some(&session)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["prolificId"], "alice");
    assert_eq!(body["name"], "Test User");
}

#[tokio::test]
async fn test_password_is_not_stored_in_clear() {
    let (app, state) = common::create_account_app();
    assert_eq!(signup(&app, "hashed", "plain-secret").await, StatusCode::CREATED);

    let Participants::Accounts(accounts) = &state.participants else {
        panic!("expected accounts");
    };
    let account = accounts.account("hashed").await.unwrap().unwrap();
    assert_ne!(account.password_hash, "plain-secret");
    assert!(account.password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn test_signup_validation() {
    let (app, _) = common::create_account_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/signup",
            json!({ "name": "Bob", "username": "bob", "password": "a", "confirmPassword": "b" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Passwords do not match");

    let response = app
        .clone()
        .oneshot(post_json(
            "/signup",
            json!({ "name": "  ", "username": "bob", "password": "a", "confirmPassword": "a" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["error"],
        "Name, username and password are required"
    );
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let (app, _) = common::create_account_app();

    assert_eq!(signup(&app, "carol", "one").await, StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post_json(
            "/signup",
            json!({ "name": "Other", "username": "carol", "password": "two", "confirmPassword": "two" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Username already exists");

    // The original password still works
    login(&app, "carol", "one").await;
}

#[tokio::test]
async fn test_wrong_credentials() {
    let (app, _) = common::create_account_app();
    assert_eq!(signup(&app, "dave", "right").await, StatusCode::CREATED);

    for body in [
        json!({ "username": "dave", "password": "wrong" }),
        json!({ "username": "nobody", "password": "right" }),
    ] {
        let response = app
            .clone()
            .oneshot(post_json("/login", body, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(response).await["error"],
            "Invalid username or password"
        );
    }
}

#[tokio::test]
async fn test_prolific_login_rejected_for_accounts() {
    let (app, _) = common::create_account_app();

    let response = app
        .oneshot(post_json("/login", json!({ "prolificId": "P1" }), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["error"],
        "Sign in with a username and password"
    );
}

#[tokio::test]
async fn test_consent_is_logged_and_folded() {
    let (app, state) = common::create_account_app();
    assert_eq!(signup(&app, "erin", "pw").await, StatusCode::CREATED);
    let session = login(&app, "erin", "pw").await;

    let response = app
        .clone()
        .oneshot(get("/check-consent", Some(&session)))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["hasConsented"], false);

    let response = app
        .clone()
        .oneshot(get("/get-llm-consent", Some(&session)))
        .await
        .unwrap();
    assert!(json_body(response).await["useData"].is_null());

    for body in [
        json!({ "response": "accept" }),
        json!({ "response": "report", "reportText": "changed my mind" }),
    ] {
        let response = app
            .clone()
            .oneshot(post_json("/save-consent", body, Some(&session)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        // Events are ordered by timestamp
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let response = app
        .clone()
        .oneshot(post_json(
            "/save-llm-consent",
            json!({ "useData": false, "toggleResponse": false }),
            Some(&session),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/check-consent", Some(&session)))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["hasConsented"], true);
    assert_eq!(body["userResponse"]["cookieResponse"], "report");
    assert_eq!(body["userResponse"]["reportText"], "changed my mind");
    assert_eq!(body["userResponse"]["llmConsent"], false);

    let Participants::Accounts(accounts) = &state.participants else {
        panic!("expected accounts");
    };
    let events = accounts.consent_events("erin").await.unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(
        events.iter().filter(|e| e.kind == ConsentKind::Cookie).count(),
        2
    );
}

#[tokio::test]
async fn test_consent_for_unknown_account() {
    let (app, _) = common::create_account_app();

    let response = app
        .oneshot(post_json(
            "/save-llm-consent",
            json!({ "prolificId": "ghost", "useData": true }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "User not found");
}

#[tokio::test]
async fn test_logout_ends_account_session() {
    let (app, state) = common::create_account_app();
    assert_eq!(signup(&app, "frank", "pw").await, StatusCode::CREATED);
    let session = login(&app, "frank", "pw").await;

    let response = app
        .clone()
        .oneshot(get("/logout", Some(&session)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let Participants::Accounts(accounts) = &state.participants else {
        panic!("expected accounts");
    };
    assert!(accounts.sessions().is_empty());

    let response = app
        .oneshot(get("/check-consent", Some(&session)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_rejects_path_like_username() {
    let (app, _) = common::create_account_app();

    let response = app
        .oneshot(post_json(
            "/signup",
            json!({ "name": "Eve", "username": "users/admin", "password": "p", "confirmPassword": "p" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"]
        .as_str()
        .unwrap()
        .starts_with("Username may only contain"));
}
