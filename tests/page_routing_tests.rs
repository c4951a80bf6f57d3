// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Static page and asset routing.

use axum::http::{header, StatusCode};
use tower::ServiceExt;

mod common;
use common::{body_bytes, get};

async fn fetch(uri: &str) -> (StatusCode, Option<String>, String) {
    let (app, _) = common::create_test_app();
    let response = app.oneshot(get(uri, None)).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    (status, content_type, body)
}

#[tokio::test]
async fn test_root_and_login_serve_login_page() {
    for uri in ["/", "/login"] {
        let (status, content_type, body) = fetch(uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(content_type.unwrap().starts_with("text/html"));
        assert!(body.contains("id=\"login-form\""));
        assert!(body.contains("prolificId"));
    }
}

#[tokio::test]
async fn test_account_store_serves_account_login() {
    let (app, _) = common::create_account_app();
    for uri in ["/", "/login"] {
        let response = app.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let body = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(body.contains("id=\"username\""), "{uri}");
        assert!(!body.contains("prolificId"), "{uri}");
    }
}

#[tokio::test]
async fn test_extensionless_path_serves_html() {
    let (status, _, body) = fetch("/home").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("checkout-btn"));

    let (status, _, body) = fetch("/account-settings").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("llm-toggle"));
}

#[tokio::test]
async fn test_assets_served_directly() {
    let (status, content_type, body) = fetch("/script.js").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().contains("javascript"));
    assert!(body.contains("checkAndShowPopups"));

    let (status, content_type, _) = fetch("/style.css").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/css"));
}

#[tokio::test]
async fn test_missing_page_is_404() {
    let (status, _, body) = fetch("/no-such-page").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Page not found");
}

#[tokio::test]
async fn test_traversal_is_404() {
    let (status, _, _) = fetch("/../Cargo").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_home_script_popup_contract() {
    let (_, _, script) = fetch("/script.js").await;

    // One retry budget for the whole chain, restarted from /user-info.
    assert!(script.contains("const MAX_ATTEMPTS = 5;"));
    assert!(script.contains("const RETRY_DELAY_MS = 1000;"));
    assert!(script.contains("const show = await popupAttempt();"));
    // Answering the cookie notice always leads on to the LLM warning.
    assert!(script.contains("await sleep(POPUP_DELAY_MS);\n    showLlmWarningPopup();"));
    // The banner's Retry reloads the page.
    assert!(script.contains("window.location.reload()"));
    // Opting out asks first.
    assert!(script.contains("showOptOutConfirmation(() => choose(false))"));
}
