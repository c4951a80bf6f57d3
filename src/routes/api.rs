// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Routes that read the logged-in participant's state.

use crate::error::{AppError, Result};
use crate::middleware::auth::SessionUser;
use crate::models::ConsentSnapshot;
use crate::AppState;
use axum::{
    extract::State,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Session-bound routes.
/// The session middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/user-info", get(user_info))
        .route("/check-consent", get(check_consent))
        .route("/get-llm-consent", get(get_llm_consent))
}

// ─── Identity ────────────────────────────────────────────────

/// Who is logged in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "public/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResponse {
    /// Prolific ID, or username for accounts
    pub prolific_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

async fn user_info(Extension(user): Extension<SessionUser>) -> Json<UserInfoResponse> {
    Json(UserInfoResponse {
        prolific_id: user.identity.participant_id,
        name: user.identity.name,
    })
}

// ─── Consent State ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "public/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ConsentCheckResponse {
    /// Whether the cookie notice has been answered
    pub has_consented: bool,
    pub user_response: ConsentSnapshot,
}

async fn check_consent(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<ConsentCheckResponse>> {
    let participant_id = &user.identity.participant_id;
    let snapshot = state
        .participants
        .snapshot(participant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let has_consented = snapshot.has_consented();
    tracing::debug!(
        participant = %participant_id,
        has_consented,
        cookie_response = ?snapshot.cookie_response,
        "Checked cookie consent"
    );

    Ok(Json(ConsentCheckResponse {
        has_consented,
        user_response: snapshot,
    }))
}

/// LLM data-use answer. `useData` is null until the participant answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "public/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct LlmConsentResponse {
    pub use_data: Option<bool>,
    #[serde(default)]
    pub toggle_response: Option<bool>,
}

async fn get_llm_consent(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<LlmConsentResponse>> {
    let snapshot = state
        .participants
        .snapshot(&user.identity.participant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(LlmConsentResponse {
        use_data: snapshot.llm_consent,
        toggle_response: snapshot.toggle_response,
    }))
}
