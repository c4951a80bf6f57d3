// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login, signup and logout routes.

use axum::{
    extract::State,
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::{cookie::CookieJar, WithRejection};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::{removal_cookie, session_cookie, SESSION_COOKIE};
use crate::models::normalize_participant_id;
use crate::routes::{pages, MessageResponse};
use crate::services::{NewAccount, Participants};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(pages::login_page).post(login))
        .route("/signup", post(signup))
        .route("/logout", get(logout))
}

/// Login form. Participants send a Prolific ID, account holders send
/// username and password; which one applies depends on the store.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub prolific_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Log in and set the session cookie.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<(CookieJar, Json<MessageResponse>)> {
    let session_id = match &state.participants {
        Participants::File(store) => {
            let prolific_id = body
                .prolific_id
                .as_deref()
                .and_then(normalize_participant_id)
                .ok_or_else(|| AppError::BadRequest("Prolific ID is required".to_string()))?;

            let outcome = store.login(&prolific_id).await?;
            if outcome.created {
                tracing::info!(prolific_id = %prolific_id, "New participant created");
            }
            tracing::info!(prolific_id = %prolific_id, "Login successful");
            outcome.session_id
        }
        Participants::Accounts(accounts) => {
            if body.username.is_none() && body.prolific_id.is_some() {
                return Err(AppError::BadRequest(
                    "Sign in with a username and password".to_string(),
                ));
            }
            let username = body.username.as_deref().map(str::trim).unwrap_or_default();
            let password = body.password.as_deref().unwrap_or_default();

            let session_id = accounts.login(username, password).await?;
            tracing::info!(username, "Login successful");
            session_id
        }
    };

    let jar = jar.add(session_cookie(session_id, state.config.cookie_secure));
    Ok((jar, MessageResponse::json("Login successful")))
}

/// Signup form (document store only).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Create an account.
async fn signup(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<SignupRequest>, AppError>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let Participants::Accounts(accounts) = &state.participants else {
        return Err(AppError::BadRequest(
            "Signup is not available for this study".to_string(),
        ));
    };

    accounts
        .signup(NewAccount {
            name: body.name.trim().to_string(),
            username: body.username.trim().to_string(),
            password: body.password,
            confirm_password: body.confirm_password,
        })
        .await?;

    Ok((StatusCode::CREATED, MessageResponse::json("Signup successful")))
}

/// End the session, drop the cookie and go back to the login page.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Result<(CookieJar, Redirect)> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        match state.participants.logout(cookie.value()).await? {
            Some(participant) => tracing::info!(participant = %participant, "Logout successful"),
            None => tracing::debug!("Logout with unknown session"),
        }
    }

    let jar = jar.add(removal_cookie(state.config.cookie_secure));
    Ok((jar, Redirect::to("/")))
}
