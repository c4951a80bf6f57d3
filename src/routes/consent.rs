// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Consent capture routes.
//!
//! The participant is taken from the session cookie when it is valid, and
//! otherwise from the `prolificId` in the body.

use crate::error::{AppError, Result};
use crate::middleware::auth::optional_identity;
use crate::models::participant::UNKNOWN_PARTICIPANT;
use crate::models::{normalize_participant_id, CookieResponse};
use crate::routes::MessageResponse;
use crate::AppState;
use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use axum_extra::extract::{cookie::CookieJar, WithRejection};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/save-consent", post(save_consent))
        .route("/save-llm-consent", post(save_llm_consent))
        .route("/save-llm-report", post(save_llm_report))
}

/// Work out whose answer this is.
async fn resolve_participant(
    state: &AppState,
    jar: &CookieJar,
    claimed: Option<&str>,
) -> Result<String> {
    let claimed = claimed.and_then(normalize_participant_id);

    if let Some(identity) = optional_identity(state, jar).await? {
        if let Some(claimed) = claimed.filter(|c| *c != identity.participant_id) {
            tracing::warn!(
                claimed = %claimed,
                participant = %identity.participant_id,
                "Body participant differs from session, using session"
            );
        }
        return Ok(identity.participant_id);
    }

    let participant_id =
        claimed.ok_or_else(|| AppError::BadRequest("Prolific ID is required".to_string()))?;
    if participant_id == UNKNOWN_PARTICIPANT {
        return Err(AppError::BadRequest(
            "Invalid prolificId: \"unknown\" is not allowed".to_string(),
        ));
    }
    Ok(participant_id)
}

// ─── Cookie Consent ──────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveConsentRequest {
    #[serde(default)]
    pub prolific_id: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub report_text: Option<String>,
}

async fn save_consent(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<SaveConsentRequest>, AppError>,
) -> Result<Json<MessageResponse>> {
    let response: CookieResponse = body
        .response
        .as_deref()
        .filter(|r| !r.is_empty())
        .ok_or_else(|| AppError::BadRequest("Prolific ID and response are required".to_string()))?
        .parse()
        .map_err(AppError::BadRequest)?;

    let participant_id = resolve_participant(&state, &jar, body.prolific_id.as_deref()).await?;

    state
        .participants
        .save_cookie_consent(&participant_id, response, body.report_text)
        .await?;

    tracing::info!(participant = %participant_id, response = %response, "Consent saved");
    Ok(MessageResponse::json("Consent saved"))
}

// ─── LLM Consent ─────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveLlmConsentRequest {
    #[serde(default)]
    pub prolific_id: Option<String>,
    #[serde(default)]
    pub use_data: Option<bool>,
    #[serde(default)]
    pub toggle_response: Option<bool>,
}

async fn save_llm_consent(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<SaveLlmConsentRequest>, AppError>,
) -> Result<Json<MessageResponse>> {
    let use_data = body
        .use_data
        .ok_or_else(|| AppError::BadRequest("useData must be true or false".to_string()))?;
    let participant_id = resolve_participant(&state, &jar, body.prolific_id.as_deref()).await?;

    state
        .participants
        .save_llm_consent(&participant_id, use_data, body.toggle_response)
        .await?;

    tracing::info!(participant = %participant_id, use_data, "LLM consent saved");
    Ok(MessageResponse::json("LLM consent saved"))
}

// ─── LLM Report ──────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveLlmReportRequest {
    #[serde(default)]
    pub prolific_id: Option<String>,
    #[serde(default)]
    pub report_text: Option<String>,
}

/// Save the free-text LLM report.
///
/// Also the target of `navigator.sendBeacon` on page unload, which may label
/// the JSON body `text/plain`, so the body is parsed regardless of its type.
async fn save_llm_report(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Bytes,
) -> Result<Json<MessageResponse>> {
    let body: SaveLlmReportRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid report body: {}", e)))?;

    let report_text = body
        .report_text
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("Report text is required".to_string()))?;
    let participant_id = resolve_participant(&state, &jar, body.prolific_id.as_deref()).await?;

    state
        .participants
        .save_llm_report(&participant_id, report_text)
        .await?;

    tracing::info!(participant = %participant_id, "LLM report saved");
    Ok(MessageResponse::json("LLM report saved"))
}
