// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie authentication middleware.

use crate::error::AppError;
use crate::services::Identity;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "sessionId";

/// Authenticated participant extracted from the session cookie.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub session_id: String,
    pub identity: Identity,
}

/// Middleware that requires a live session.
///
/// A missing cookie and a token that no longer maps to anyone are both 401.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(session_id) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) else {
        tracing::debug!(path = %request.uri().path(), "No session cookie");
        return Err(AppError::Unauthorized);
    };

    let Some(identity) = state.participants.identify(&session_id).await? else {
        tracing::info!(path = %request.uri().path(), "Unknown session");
        return Err(AppError::Unauthorized);
    };

    request.extensions_mut().insert(SessionUser {
        session_id,
        identity,
    });

    Ok(next.run(request).await)
}

/// Resolve the session cookie if present, without requiring one.
pub async fn optional_identity(
    state: &AppState,
    jar: &CookieJar,
) -> Result<Option<Identity>, AppError> {
    match jar.get(SESSION_COOKIE) {
        Some(cookie) => state.participants.identify(cookie.value()).await,
        None => Ok(None),
    }
}

/// Build the session cookie set at login.
pub fn session_cookie(session_id: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .build()
}

/// Build a cookie that makes the browser drop the session.
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = session_cookie(String::new(), secure);
    cookie.make_removal();
    cookie
}
