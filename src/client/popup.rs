// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Popup sequencing for the home page.
//!
//! One attempt is four strictly sequential steps: fetch the identity, fetch
//! the cookie-consent state, fetch the LLM consent (only once cookie consent
//! exists), then decide. A failing step aborts the attempt. Attempts are
//! retried with a fixed delay until the budget runs out, after which an error
//! banner is returned instead of a popup.

use super::ClientError;
use crate::models::CookieResponse;
use crate::routes::api::{ConsentCheckResponse, LlmConsentResponse, UserInfoResponse};
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Attempts before giving up.
pub const MAX_ATTEMPTS: u32 = 5;
/// Pause between attempts.
pub const RETRY_DELAY: Duration = Duration::from_secs(1);
/// Pause before a popup appears.
pub const POPUP_DELAY: Duration = Duration::from_secs(1);
/// The only page that shows consent popups.
pub const HOME_PATH: &str = "/home";

/// Where the sequencer gets its answers from.
pub trait ConsentSource {
    fn user_info(&self) -> impl Future<Output = Result<UserInfoResponse, ClientError>> + Send;

    fn check_consent(
        &self,
    ) -> impl Future<Output = Result<ConsentCheckResponse, ClientError>> + Send;

    fn llm_consent(&self) -> impl Future<Output = Result<LlmConsentResponse, ClientError>> + Send;

    fn save_consent(
        &self,
        participant_id: &str,
        response: CookieResponse,
        report_text: Option<&str>,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// Fixed-count, fixed-delay retry. No jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            delay: RETRY_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Popup {
    /// Cookie notice with accept / report buttons
    CookieNotice { participant_id: String },
    /// LLM data-use warning linking to account settings
    LlmWarning { participant_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerAction {
    /// Go back to the login page
    LogIn,
    /// Reload the current page
    Retry,
}

impl BannerAction {
    pub fn label(&self) -> &'static str {
        match self {
            BannerAction::LogIn => "Log In",
            BannerAction::Retry => "Retry",
        }
    }
}

/// Dismissible error shown once retries are exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBanner {
    pub message: String,
    pub actions: [BannerAction; 2],
}

impl ErrorBanner {
    fn new(message: String) -> Self {
        Self {
            message,
            actions: [BannerAction::LogIn, BannerAction::Retry],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupDecision {
    /// Not on the home page; nothing was fetched
    Skipped,
    /// Both consents are on record
    NothingToShow,
    Show { popup: Popup, after: Duration },
    Error(ErrorBanner),
}

/// Which step of an attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    UserInfo,
    ConsentStatus,
    LlmConsent,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::UserInfo => "user info",
            Step::ConsentStatus => "consent status",
            Step::LlmConsent => "LLM consent",
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to fetch {step}: {source}")]
struct StepError {
    step: Step,
    source: ClientError,
}

fn at(step: Step) -> impl FnOnce(ClientError) -> StepError {
    move |source| StepError { step, source }
}

/// Runs the popup check against a [`ConsentSource`].
pub struct PopupSequencer<S> {
    source: S,
    policy: RetryPolicy,
    popup_delay: Duration,
}

impl<S: ConsentSource> PopupSequencer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            policy: RetryPolicy::default(),
            popup_delay: POPUP_DELAY,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_popup_delay(mut self, delay: Duration) -> Self {
        self.popup_delay = delay;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Decide what the page at `page_path` should show.
    pub async fn check_and_decide(&self, page_path: &str) -> PopupDecision {
        if page_path != HOME_PATH {
            tracing::debug!(page_path, "Not on home page, skipping popup check");
            return PopupDecision::Skipped;
        }

        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.attempt().await {
                Ok(decision) => return decision,
                Err(err) if attempt < max_attempts => {
                    tracing::warn!(attempt, error = %err, "Popup check failed, retrying");
                    tokio::time::sleep(self.policy.delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    tracing::error!(attempt, error = %err, "Popup check failed after maximum attempts");
                    return PopupDecision::Error(ErrorBanner::new(format!(
                        "{err}. Please try again or log in."
                    )));
                }
            }
        }
    }

    async fn attempt(&self) -> Result<PopupDecision, StepError> {
        let user = self.source.user_info().await.map_err(at(Step::UserInfo))?;
        let participant_id = user.prolific_id.trim().to_string();

        let consent = self
            .source
            .check_consent()
            .await
            .map_err(at(Step::ConsentStatus))?;
        if !consent.has_consented {
            return Ok(self.show(Popup::CookieNotice { participant_id }));
        }

        let llm = self
            .source
            .llm_consent()
            .await
            .map_err(at(Step::LlmConsent))?;
        match llm.use_data {
            Some(_) => Ok(PopupDecision::NothingToShow),
            None => Ok(self.show(Popup::LlmWarning { participant_id })),
        }
    }

    /// Save the cookie-notice answer. The LLM warning follows whether or not
    /// the save succeeded.
    pub async fn submit_cookie_consent(
        &self,
        participant_id: &str,
        response: CookieResponse,
        report_text: Option<&str>,
    ) -> PopupDecision {
        let participant_id = participant_id.trim();
        if let Err(err) = self
            .source
            .save_consent(participant_id, response, report_text)
            .await
        {
            tracing::warn!(error = %err, "Failed to save consent, showing LLM warning anyway");
        }
        self.show(Popup::LlmWarning {
            participant_id: participant_id.to_string(),
        })
    }

    fn show(&self, popup: Popup) -> PopupDecision {
        PopupDecision::Show {
            popup,
            after: self.popup_delay,
        }
    }
}
