// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Consent flags shared by both persistence variants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Participant's answer to the cookie notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "public/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum CookieResponse {
    Accept,
    Report,
    Agree,
}

impl CookieResponse {
    pub fn as_str(&self) -> &'static str {
        match self {
            CookieResponse::Accept => "accept",
            CookieResponse::Report => "report",
            CookieResponse::Agree => "agree",
        }
    }
}

impl fmt::Display for CookieResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CookieResponse {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(CookieResponse::Accept),
            "report" => Ok(CookieResponse::Report),
            "agree" => Ok(CookieResponse::Agree),
            other => Err(format!("Unknown consent response: {other}")),
        }
    }
}

/// Uniform view of everything a participant has answered so far.
///
/// Built directly from a [`ParticipantRecord`](super::ParticipantRecord) in the
/// file-backed variant, or folded from the consent event log in the
/// document-store variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "public/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ConsentSnapshot {
    pub prolific_id: String,
    pub cookie_response: Option<CookieResponse>,
    pub report_text: Option<String>,
    pub llm_consent: Option<bool>,
    pub toggle_response: Option<bool>,
    pub llm_report_text: Option<String>,
    pub timestamp: Option<String>,
}

impl ConsentSnapshot {
    /// Whether the cookie notice has been answered.
    pub fn has_consented(&self) -> bool {
        self.cookie_response.is_some()
    }
}
