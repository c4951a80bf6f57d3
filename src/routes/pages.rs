//! Static page routing.
//!
//! `/` and `/login` serve the login page for the configured store. Any
//! other path that is not an asset in the public directory is served as
//! `<path>.html`.

use crate::services::Participants;
use crate::AppState;
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const LOGIN_PAGE: &str = "login.html";
const ACCOUNT_LOGIN_PAGE: &str = "account-login.html";

/// Prolific-ID form for the file store, username/password for accounts.
pub async fn login_page(State(state): State<Arc<AppState>>) -> Response {
    let page = match state.participants {
        Participants::File(_) => LOGIN_PAGE,
        Participants::Accounts(_) => ACCOUNT_LOGIN_PAGE,
    };
    serve_html(&state.config.public_dir.join(page)).await
}

/// Serve `<public_dir>/<path>.html` or 404.
pub async fn serve_page(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    match page_path(&state.config.public_dir, uri.path()) {
        Some(path) => serve_html(&path).await,
        None => page_not_found(),
    }
}

/// Map a request path onto an HTML file inside `public_dir`.
///
/// Returns `None` for the root and for any path with empty, `.` or `..`
/// segments.
pub fn page_path(public_dir: &Path, request_path: &str) -> Option<PathBuf> {
    let trimmed = request_path.trim_start_matches('/').trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    let safe = trimmed
        .split('/')
        .all(|segment| !segment.is_empty() && segment != "." && segment != ".." && !segment.contains('\\'));
    if !safe {
        return None;
    }
    Some(public_dir.join(format!("{trimmed}.html")))
}

async fn serve_html(path: &Path) -> Response {
    match tokio::fs::read_to_string(path).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Page not found");
            page_not_found()
        }
    }
}

fn page_not_found() -> Response {
    (StatusCode::NOT_FOUND, "Page not found").into_response()
}
