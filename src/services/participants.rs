// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Participant operations shared by both persistence variants.
//!
//! Route handlers talk to [`Participants`] and never to a concrete store, so
//! the consent endpoints behave the same whichever variant is configured.

use crate::config::{Config, StoreBackend};
use crate::db::{DocumentDb, FileStore};
use crate::error::AppError;
use crate::models::{ConsentEvent, ConsentSnapshot, CookieResponse};
use crate::services::accounts::AccountService;
use crate::time_utils::now_rfc3339;

/// Who a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Prolific ID or username
    pub participant_id: String,
    /// Display name (accounts only)
    pub name: Option<String>,
}

/// The configured participant store.
#[derive(Clone)]
pub enum Participants {
    /// Prolific-ID records in `user_responses.json`
    File(FileStore),
    /// Username/password accounts in the document store
    Accounts(AccountService),
}

impl Participants {
    /// Build the store selected by `config`.
    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        Ok(match config.store_backend {
            StoreBackend::File => {
                tracing::info!(path = %config.user_responses_file.display(), "Using file participant store");
                Participants::File(FileStore::new(&config.user_responses_file))
            }
            StoreBackend::Firestore => {
                let db = DocumentDb::new(&config.gcp_project_id).await?;
                Participants::Accounts(AccountService::new(db))
            }
            StoreBackend::Memory => {
                tracing::info!("Using in-memory document store");
                Participants::Accounts(AccountService::new(DocumentDb::new_in_memory()))
            }
        })
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Participants::File(_) => "file",
            Participants::Accounts(_) => "accounts",
        }
    }

    /// Resolve a session token.
    pub async fn identify(&self, session_id: &str) -> Result<Option<Identity>, AppError> {
        match self {
            Participants::File(store) => Ok(store.find_by_session(session_id).await?.map(|r| {
                Identity {
                    participant_id: r.prolific_id,
                    name: None,
                }
            })),
            Participants::Accounts(accounts) => {
                let Some(username) = accounts.sessions().resolve(session_id) else {
                    return Ok(None);
                };
                let name = accounts.account(&username).await?.map(|a| a.name);
                Ok(Some(Identity {
                    participant_id: username,
                    name,
                }))
            }
        }
    }

    /// End a session. Returns the participant it belonged to.
    pub async fn logout(&self, session_id: &str) -> Result<Option<String>, AppError> {
        match self {
            Participants::File(store) => store.clear_session(session_id).await,
            Participants::Accounts(accounts) => Ok(accounts.sessions().remove(session_id)),
        }
    }

    /// Everything the participant has answered, or `None` if unknown.
    pub async fn snapshot(
        &self,
        participant_id: &str,
    ) -> Result<Option<ConsentSnapshot>, AppError> {
        match self {
            Participants::File(store) => Ok(store.find(participant_id).await?.map(|r| r.snapshot())),
            Participants::Accounts(accounts) => {
                if accounts.account(participant_id).await?.is_none() {
                    return Ok(None);
                }
                Ok(Some(accounts.snapshot(participant_id).await?))
            }
        }
    }

    /// Record the cookie-notice answer.
    pub async fn save_cookie_consent(
        &self,
        participant_id: &str,
        response: CookieResponse,
        report_text: Option<String>,
    ) -> Result<(), AppError> {
        match self {
            Participants::File(store) => {
                let updated = store
                    .update(participant_id, |r| {
                        r.cookie_response = Some(response);
                        r.report_text = report_text;
                    })
                    .await?;
                require_found(updated)
            }
            Participants::Accounts(accounts) => {
                accounts
                    .record(ConsentEvent::cookie(
                        participant_id,
                        response,
                        report_text,
                        now_rfc3339(),
                    ))
                    .await
            }
        }
    }

    /// Record the LLM data-use answer and, when given, the toggle state.
    pub async fn save_llm_consent(
        &self,
        participant_id: &str,
        use_data: bool,
        toggle_response: Option<bool>,
    ) -> Result<(), AppError> {
        match self {
            Participants::File(store) => {
                let updated = store
                    .update(participant_id, |r| {
                        r.llm_consent = Some(use_data);
                        if toggle_response.is_some() {
                            r.toggle_response = toggle_response;
                        }
                    })
                    .await?;
                require_found(updated)
            }
            Participants::Accounts(accounts) => {
                accounts
                    .record(ConsentEvent::llm(
                        participant_id,
                        use_data,
                        toggle_response,
                        now_rfc3339(),
                    ))
                    .await
            }
        }
    }

    /// Store free-text feedback about LLM data use.
    pub async fn save_llm_report(
        &self,
        participant_id: &str,
        report_text: String,
    ) -> Result<(), AppError> {
        match self {
            Participants::File(store) => {
                let updated = store
                    .update(participant_id, |r| r.llm_report_text = Some(report_text))
                    .await?;
                require_found(updated)
            }
            Participants::Accounts(accounts) => {
                accounts
                    .record(ConsentEvent::llm_report(
                        participant_id,
                        report_text,
                        now_rfc3339(),
                    ))
                    .await
            }
        }
    }
}

fn require_found<T>(value: Option<T>) -> Result<(), AppError> {
    value
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}
