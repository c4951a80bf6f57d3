// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod account;
pub mod consent;
pub mod participant;

pub use account::{fold_events, Account, ConsentEvent, ConsentKind};
pub use consent::{ConsentSnapshot, CookieResponse};
pub use participant::{normalize_participant_id, ParticipantRecord};
