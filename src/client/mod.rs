//! Client side of the consent flow.
//!
//! [`PopupSequencer`] decides which popup, if any, the home page shows.
//! [`HttpConsentClient`] feeds it from a running server.

pub mod http;
pub mod popup;

pub use http::HttpConsentClient;
pub use popup::{
    BannerAction, ConsentSource, ErrorBanner, Popup, PopupDecision, PopupSequencer, RetryPolicy,
};

/// Failure of a single request made by the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Non-2xx response
    #[error("{status} - {body}")]
    Status { status: u16, body: String },

    /// A 2xx body that carried an `error` field
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}
