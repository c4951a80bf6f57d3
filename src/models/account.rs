//! Account and consent-log models for the document store.

use serde::{Deserialize, Serialize};

use super::consent::{ConsentSnapshot, CookieResponse};

/// Account stored in the `users` collection (document ID = username).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Display name given at signup
    pub name: String,
    /// Unique login name
    pub username: String,
    /// Argon2id PHC string
    pub password_hash: String,
    /// When the account was created
    pub created_at: String,
}

/// What a consent event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentKind {
    Cookie,
    Llm,
    LlmReport,
}

/// One write to the `user_data` collection.
///
/// The collection is an append-only log: answering twice produces two
/// documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsentEvent {
    /// Time-ordered UUIDv7; orders events written within one millisecond
    #[serde(default)]
    pub id: String,
    pub username: String,
    pub kind: ConsentKind,
    /// `accept`/`report`/`agree` for cookie events, `true`/`false` for LLM events
    pub response: String,
    #[serde(default)]
    pub report_text: Option<String>,
    #[serde(default)]
    pub toggle_response: Option<bool>,
    pub timestamp: String,
}

impl ConsentEvent {
    pub fn cookie(
        username: &str,
        response: CookieResponse,
        report_text: Option<String>,
        timestamp: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            username: username.to_string(),
            kind: ConsentKind::Cookie,
            response: response.to_string(),
            report_text,
            toggle_response: None,
            timestamp,
        }
    }

    pub fn llm(
        username: &str,
        use_data: bool,
        toggle_response: Option<bool>,
        timestamp: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            username: username.to_string(),
            kind: ConsentKind::Llm,
            response: use_data.to_string(),
            report_text: None,
            toggle_response,
            timestamp,
        }
    }

    pub fn llm_report(username: &str, report_text: String, timestamp: String) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            username: username.to_string(),
            kind: ConsentKind::LlmReport,
            response: "report".to_string(),
            report_text: Some(report_text),
            toggle_response: None,
            timestamp,
        }
    }
}

/// Fold a participant's consent log into a snapshot. Later events win.
///
/// Events with an unreadable `response` are skipped.
pub fn fold_events(username: &str, events: &[ConsentEvent]) -> ConsentSnapshot {
    let mut ordered: Vec<&ConsentEvent> = events.iter().collect();
    // RFC 3339 strings in one format sort chronologically; hyphenated v7
    // ids sort by creation.
    ordered.sort_by(|a, b| (&a.timestamp, &a.id).cmp(&(&b.timestamp, &b.id)));

    let mut snapshot = ConsentSnapshot {
        prolific_id: username.to_string(),
        ..Default::default()
    };

    for event in ordered {
        match event.kind {
            ConsentKind::Cookie => {
                let Ok(response) = event.response.parse::<CookieResponse>() else {
                    continue;
                };
                snapshot.cookie_response = Some(response);
                snapshot.report_text = event.report_text.clone();
            }
            ConsentKind::Llm => {
                let Ok(use_data) = event.response.parse::<bool>() else {
                    continue;
                };
                snapshot.llm_consent = Some(use_data);
                if event.toggle_response.is_some() {
                    snapshot.toggle_response = event.toggle_response;
                }
            }
            ConsentKind::LlmReport => {
                snapshot.llm_report_text = event.report_text.clone();
            }
        }
        snapshot.timestamp = Some(event.timestamp.clone());
    }

    snapshot
}
