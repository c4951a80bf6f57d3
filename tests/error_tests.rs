// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::IntoResponse;
use shopwithus::error::AppError;
use tower::ServiceExt;

mod common;

async fn error_body(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_client_errors_keep_message() {
    let (status, body) = error_body(AppError::BadRequest("Prolific ID is required".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Prolific ID is required");

    let (status, body) = error_body(AppError::NotFound("User not found".into())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (status, body) = error_body(AppError::Unauthorized).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Not authenticated");

    let (status, _) = error_body(AppError::InvalidCredentials).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_server_errors_are_masked() {
    let (status, body) =
        error_body(AppError::Database("Failed to write user_responses.json".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");

    let (status, body) = error_body(AppError::Internal(anyhow::anyhow!("hash failed"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}

fn raw_post(uri: &str, content_type: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_malformed_bodies_are_json_bad_requests() {
    let (app, _) = common::create_test_app();
    let json = Some("application/json");

    let cases = [
        raw_post("/save-llm-consent", json, r#"{"prolificId":"P1","useData":"yes"}"#),
        raw_post("/login", json, r#"{"prolificId":123}"#),
        raw_post("/login", None, r#"{"prolificId":"P1"}"#),
        raw_post("/save-consent", json, "{not json"),
        raw_post("/signup", json, "[]"),
    ];
    for request in cases {
        let uri = request.uri().to_string();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("application/json"));
        let body = common::json_body(response).await;
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()), "{uri}");
    }
}
