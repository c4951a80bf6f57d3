//! Participant record for the file-backed store.

use serde::{Deserialize, Serialize};

use super::consent::{ConsentSnapshot, CookieResponse};

/// Placeholder the client sends when it never learned the participant's ID.
pub const UNKNOWN_PARTICIPANT: &str = "unknown";

/// One entry of `user_responses.json`.
///
/// Optional fields default to `null` so files written before a field existed
/// still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRecord {
    /// Trimmed Prolific ID (unique key)
    pub prolific_id: String,
    /// Current session token, cleared at logout
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub cookie_response: Option<CookieResponse>,
    #[serde(default)]
    pub report_text: Option<String>,
    #[serde(default)]
    pub llm_consent: Option<bool>,
    #[serde(default)]
    pub toggle_response: Option<bool>,
    #[serde(default)]
    pub llm_report_text: Option<String>,
    /// Last write (RFC 3339)
    pub timestamp: String,
}

impl ParticipantRecord {
    /// Fresh record created at first login. LLM consent starts out granted.
    pub fn new(prolific_id: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            prolific_id: prolific_id.into(),
            session_id: None,
            cookie_response: None,
            report_text: None,
            llm_consent: Some(true),
            toggle_response: None,
            llm_report_text: None,
            timestamp: timestamp.into(),
        }
    }

    pub fn snapshot(&self) -> ConsentSnapshot {
        ConsentSnapshot {
            prolific_id: self.prolific_id.clone(),
            cookie_response: self.cookie_response,
            report_text: self.report_text.clone(),
            llm_consent: self.llm_consent,
            toggle_response: self.toggle_response,
            llm_report_text: self.llm_report_text.clone(),
            timestamp: Some(self.timestamp.clone()),
        }
    }
}

/// Trim a participant identifier, rejecting empty ones.
pub fn normalize_participant_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
